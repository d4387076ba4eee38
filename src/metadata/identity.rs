//! Module identity.
//!
//! This module provides [`ModuleId`], the module version id (MVID) that the runtime reports
//! together with a metadata token whenever execution stops. The MVID is a 128-bit GUID stored
//! in the module's own `Module` table row and is regenerated on every compilation, so two
//! builds of the same source never share an identity.
//!
//! # Example
//! ```rust
//! use evalscope::metadata::identity::ModuleId;
//!
//! let id = ModuleId::parse("d437908e-65e6-487c-9735-7bdff699bea5")?;
//! assert_eq!(id.to_string(), "d437908e-65e6-487c-9735-7bdff699bea5");
//! # Ok::<(), evalscope::Error>(())
//! ```

use std::fmt;

use crate::Result;

/// The module version id of one loaded module.
///
/// Opaque and immutable; the only meaningful operations are equality and hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(uguid::Guid);

impl ModuleId {
    /// Wraps an already decoded GUID
    #[must_use]
    pub const fn new(guid: uguid::Guid) -> Self {
        ModuleId(guid)
    }

    /// Creates an identity from the 16 bytes stored in the `#GUID` heap
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        ModuleId(uguid::Guid::from_bytes(bytes))
    }

    /// Parses the canonical hyphenated text form.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `text` is not a valid GUID.
    pub fn parse(text: &str) -> Result<Self> {
        match uguid::Guid::try_parse(text) {
            Ok(guid) => Ok(ModuleId(guid)),
            Err(e) => Err(malformed_error!("Invalid MVID '{}' - {}", text, e)),
        }
    }

    /// Returns the underlying GUID
    #[must_use]
    pub const fn guid(&self) -> uguid::Guid {
        self.0
    }

    /// Returns the raw bytes, in the layout of the `#GUID` heap
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

impl From<uguid::Guid> for ModuleId {
    fn from(guid: uguid::Guid) -> Self {
        ModuleId(guid)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_and_hash() {
        let a = ModuleId::new(uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5"));
        let b = ModuleId::parse("D437908E-65E6-487C-9735-7BDFF699BEA5").unwrap();
        let c = ModuleId::from_bytes([0xAA; 16]);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn bytes_survive() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        assert_eq!(ModuleId::from_bytes(bytes).to_bytes(), bytes);
    }

    #[test]
    fn parse_invalid() {
        assert!(ModuleId::parse("not-a-guid").is_err());
    }
}
