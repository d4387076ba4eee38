//! # evalscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the evalscope library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all evalscope operations
pub use crate::{Error, SymbolKind};

/// The result type used throughout evalscope
pub use crate::Result;

// ================================================================================================
// Evaluation Contexts
// ================================================================================================

/// Entry points for one debugger stop
pub use crate::evaluation::{EvaluationContext, MetadataBlock, MethodOrigin, ReferencedAssembly};

/// Compilation options
pub use crate::evaluation::options::{
    CompilationOptions, MetadataImportOptions, OptimizationLevel, OutputKind, Platform,
};

// ================================================================================================
// Metadata
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Module identity
pub use crate::metadata::identity::ModuleId;

/// Reader boundary and in-memory images
pub use crate::metadata::{
    image::{MetadataImage, MetadataImageBuilder},
    reader::MetadataReader,
};

/// Table ids and rows
pub use crate::metadata::tables::{
    AssemblyRow, CustomAttributeRow, MethodDefRow, ModuleRow, TableId, TypeAttributes, TypeDefRow,
};

/// Per-module token decoder
pub use crate::metadata::module::LoadedModule;

// ================================================================================================
// Symbols
// ================================================================================================

/// Type and method symbols
pub use crate::metadata::typesystem::{
    MethodSymbol, MethodSymbolRc, Symbol, SymbolOrigin, TypeSymbol, TypeSymbolRc,
};
