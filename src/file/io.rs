//! Low-level byte order and safe reading utilities for metadata blobs.
//!
//! This module provides bounds-checked, little-endian reads of primitive types from byte
//! buffers. It is the foundation of [`crate::file::parser::Parser`], which decodes the custom
//! attribute blobs the resolver consults.
//!
//! # Key Components
//!
//! - [`crate::file::io::CilIO`] - Trait defining endian-aware conversion for primitive types
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Result<T>`] and will return [`crate::Error::OutOfBounds`]
//! if there are insufficient bytes in the buffer to complete the operation.

use crate::Result;

/// Trait for implementing type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(u8 => 1, i8 => 1, u16 => 2, i16 => 2, u32 => 4, i32 => 4, u64 => 8, i64 => 8);

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing
/// `offset` by the size of `T` on success.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_le_at_u32() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut offset = 0;
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 0x0403_0201);
    }

    #[test]
    fn read_le_at_advances() {
        let data = [0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut offset = 0;

        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 1);
        assert_eq!(offset, 2);
        assert_eq!(read_le_at::<i32>(&data, &mut offset).unwrap(), -1);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_le_at_out_of_bounds_keeps_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut offset = 1;

        assert!(matches!(
            read_le_at::<u32>(&data, &mut offset),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(offset, 1);
    }
}
