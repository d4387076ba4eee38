//! Metadata model and token decoding for .NET modules.
//!
//! This module holds everything below the evaluation context: the row types of the metadata
//! tables the resolver consults, the [`reader::MetadataReader`] boundary, the symbol model
//! and the per-module token decoder.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`identity`] - Module version ids
//! - [`tables`] - Row types and table ids
//! - [`reader`] - The metadata reader trait
//! - [`image`] - In-memory metadata images and their builder
//! - [`module`] - The symbol-table view of one loaded module
//! - [`typesystem`] - Type and method symbols
//! - [`generatednames`] - Parsing of compiler-generated names
//! - [`customattributes`] - Decoding of the custom attributes the resolver reads

/// Implementation of custom attribute decoding
pub mod customattributes;
/// Parsing of names the C# compiler generates for synthesized members
pub mod generatednames;
/// Module identities
pub mod identity;
/// In-memory metadata images
pub mod image;
/// The symbol-table view of a loaded module
pub mod module;
/// The metadata reader boundary
pub mod reader;
/// Row types of the .NET metadata tables
pub mod tables;
/// Commonly used metadata token type
pub mod token;
/// Type and method symbols
pub mod typesystem;
