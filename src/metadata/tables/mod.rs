//! Decoded metadata table rows.
//!
//! The resolver does not parse the `#~` stream itself. A [`crate::metadata::reader::MetadataReader`]
//! hands out rows of the tables below with heap indexes already resolved to strings, GUIDs and
//! blobs. This module defines those row shapes together with the flag constants needed to
//! interpret them.
//!
//! # Key Components
//!
//! - [`crate::metadata::tables::TableId`] - Table selectors as stored in token high bytes
//! - [`crate::metadata::tables::ModuleRow`] / [`crate::metadata::tables::AssemblyRow`] - Module and assembly identity
//! - [`crate::metadata::tables::TypeDefRow`] - Type definitions and their method ranges
//! - [`crate::metadata::tables::MethodDefRow`] - Method definitions
//! - [`crate::metadata::tables::CustomAttributeRow`] - Attribute applications with value blobs

mod customattribute;
mod methoddef;
mod module;
mod tableid;
mod typedef;

pub use customattribute::CustomAttributeRow;
pub use methoddef::{MethodAccessFlags, MethodDefRow, MethodModifiers, METHOD_ACCESS_MASK};
pub use module::{AssemblyRow, ModuleRow};
pub use tableid::TableId;
pub use typedef::{TypeAttributes, TypeDefRow};
