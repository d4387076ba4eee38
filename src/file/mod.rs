//! Binary decoding primitives for metadata blobs.
//!
//! The resolver never parses PE images itself; rows arrive already decoded through
//! [`crate::metadata::reader::MetadataReader`]. What remains binary are the custom attribute
//! value blobs, which are decoded with the cursor reader in this module.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - Bounds-checked cursor with ECMA-335 compressed
//!   integer and `SerString` support
//! - [`crate::file::io`] - Little-endian primitive reads shared by the parser

pub(crate) mod io;
pub mod parser;
