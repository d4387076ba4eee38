//! Custom attribute lookup and value decoding.
//!
//! Compilers record which synthetic type implements an `async` or iterator method by applying
//! `AsyncStateMachineAttribute` / `IteratorStateMachineAttribute` to the user method. The single
//! constructor argument is a `System.Type`, which custom attribute blobs encode as the
//! serialized type name in a `SerString` (ECMA-335 II.23.3):
//!
//! - **Prolog** - `0x0001`
//! - **Fixed argument** - `0xFF` for null, otherwise a compressed length and UTF-8 bytes
//! - **Named arguments** - `u16` count, followed by the arguments themselves
//!
//! Only that string-like fixed argument is decoded here; named arguments are never needed.
//!
//! # Examples
//!
//! ```rust
//! use evalscope::metadata::customattributes::decode_string_argument;
//!
//! let blob = [0x01, 0x00, 0x03, b'A', b'+', b'B', 0x00, 0x00];
//! assert_eq!(decode_string_argument(&blob)?.as_deref(), Some("A+B"));
//! # Ok::<(), evalscope::Error>(())
//! ```

use crate::{metadata::tables::CustomAttributeRow, Parser, Result};

/// Prolog every custom attribute value blob starts with
pub const CUSTOM_ATTRIBUTE_PROLOG: u16 = 0x0001;

/// Identifies an attribute type by namespace and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescription {
    /// Namespace of the attribute type
    pub namespace: &'static str,
    /// Simple name of the attribute type
    pub name: &'static str,
}

impl AttributeDescription {
    /// `System.Runtime.CompilerServices.AsyncStateMachineAttribute`
    pub const ASYNC_STATE_MACHINE: AttributeDescription = AttributeDescription {
        namespace: "System.Runtime.CompilerServices",
        name: "AsyncStateMachineAttribute",
    };

    /// `System.Runtime.CompilerServices.IteratorStateMachineAttribute`
    pub const ITERATOR_STATE_MACHINE: AttributeDescription = AttributeDescription {
        namespace: "System.Runtime.CompilerServices",
        name: "IteratorStateMachineAttribute",
    };

    /// Returns true if `row` applies an attribute of this type
    #[must_use]
    pub fn matches(&self, row: &CustomAttributeRow) -> bool {
        row.type_name == self.name && row.type_namespace == self.namespace
    }
}

/// Decodes the single string-like fixed argument of an attribute value blob.
///
/// Returns `Ok(None)` for a null argument.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a wrong prolog or invalid UTF-8, and
/// [`crate::Error::OutOfBounds`] for a truncated blob.
pub fn decode_string_argument(blob: &[u8]) -> Result<Option<String>> {
    let mut parser = Parser::new(blob);

    let prolog = parser.read_le::<u16>()?;
    if prolog != CUSTOM_ATTRIBUTE_PROLOG {
        return Err(malformed_error!(
            "Invalid custom attribute prolog - expected 0x0001, got 0x{:04x}",
            prolog
        ));
    }

    let value = parser.read_ser_string()?;

    // The named argument count is optional in practice; some emitters omit it entirely
    if parser.remaining() >= 2 {
        let named = parser.read_le::<u16>()?;
        if named > 0 {
            tracing::trace!(named, "ignoring named arguments of string-valued attribute");
        }
    }

    Ok(value)
}
