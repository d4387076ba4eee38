//! Read-only symbols reconstructed from metadata.
//!
//! Symbols are what the expression evaluator binds against: a [`crate::metadata::typesystem::TypeSymbol`]
//! or [`crate::metadata::typesystem::MethodSymbol`] carries the names, generic shape, flags and
//! containing type of a definition, plus a [`crate::metadata::typesystem::SymbolOrigin`] recording
//! where it came from. Symbols decoded from a module are shared behind `Arc`s and cached per
//! module by [`crate::metadata::module::LoadedModule`].
//!
//! Constructed generic instances (`List<int>` from `List<T>`) are separate symbols that link back
//! to their definition; comparing `original_definition()`s is how two views of the same
//! definition are recognized as equal.
//!
//! # Key Components
//!
//! - [`crate::metadata::typesystem::Symbol`] - Closed sum over types and methods
//! - [`crate::metadata::typesystem::TypeSymbol`] - Type definitions and constructed instances
//! - [`crate::metadata::typesystem::MethodSymbol`] - Method definitions
//! - [`crate::metadata::typesystem::SerializedTypeName`] - Parser for reflection-style type names

mod methods;
mod serialized;
mod types;

pub use methods::{MethodSymbol, MethodSymbolRc};
pub use serialized::{NameSuffix, SerializedTypeName};
pub use types::{TypeSymbol, TypeSymbolRc};

use std::fmt;

use crate::{
    error::SymbolKind,
    metadata::{identity::ModuleId, token::Token},
};

/// Where a symbol was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// Decoded from the metadata row `token` of `module`
    Metadata {
        /// Identity of the module the row belongs to
        module: ModuleId,
        /// Token of the defining row
        token: Token,
    },
    /// Declared in source compiled as part of the evaluation
    Source,
    /// Created by the evaluator itself
    Synthetic,
}

impl SymbolOrigin {
    /// The module of a metadata symbol
    #[must_use]
    pub fn module(&self) -> Option<ModuleId> {
        match self {
            SymbolOrigin::Metadata { module, .. } => Some(*module),
            _ => None,
        }
    }

    /// The token of a metadata symbol
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self {
            SymbolOrigin::Metadata { token, .. } => Some(*token),
            _ => None,
        }
    }
}

/// A resolved type or method.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A type definition or constructed type
    Type(TypeSymbolRc),
    /// A method definition
    Method(MethodSymbolRc),
}

impl Symbol {
    /// Simple name of the symbol, without generic arity
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(ty) => &ty.name,
            Symbol::Method(method) => &method.name,
        }
    }

    /// Where the symbol was obtained from
    #[must_use]
    pub fn origin(&self) -> SymbolOrigin {
        match self {
            Symbol::Type(ty) => ty.origin,
            Symbol::Method(method) => method.origin,
        }
    }

    /// Whether this is a type or a method
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Type(_) => SymbolKind::Type,
            Symbol::Method(_) => SymbolKind::Method,
        }
    }

    /// The type, if this symbol is one
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeSymbolRc> {
        match self {
            Symbol::Type(ty) => Some(ty),
            Symbol::Method(_) => None,
        }
    }

    /// The method, if this symbol is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodSymbolRc> {
        match self {
            Symbol::Method(method) => Some(method),
            Symbol::Type(_) => None,
        }
    }
}

impl From<TypeSymbolRc> for Symbol {
    fn from(ty: TypeSymbolRc) -> Self {
        Symbol::Type(ty)
    }
}

impl From<MethodSymbolRc> for Symbol {
    fn from(method: MethodSymbolRc) -> Self {
        Symbol::Method(method)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Type(ty) => write!(f, "{ty}"),
            Symbol::Method(method) => write!(f, "{method}"),
        }
    }
}
