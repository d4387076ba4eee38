//! Evaluation contexts: the per-stop compilation unit expressions are bound against.
//!
//! An [`EvaluationContext`] is created once per debugger stop from the metadata of every
//! module loaded at that moment, answers symbol lookups for `(MVID, token)` pairs reported by
//! the runtime, and is discarded when execution resumes. It never outlives the stop: the
//! modules loaded in the debuggee can change as soon as it runs again.
//!
//! # Key Components
//!
//! - [`EvaluationContext`] - Module registry and resolution entry points
//! - [`MetadataBlock`] - One module snapshot handed to the assembler
//! - [`ReferencedAssembly`] - A manifest module plus its attached netmodules
//! - [`crate::evaluation::options`] - Compilation options of the context
//! - [`crate::evaluation::statemachine`] - Recovery of user methods from state machines
//!
//! # Examples
//!
//! ```rust
//! use evalscope::prelude::*;
//!
//! let mvid = ModuleId::from_bytes([1; 16]);
//! let mut builder = MetadataImageBuilder::new("Demo.dll", mvid);
//! builder.assembly("Demo");
//!
//! let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
//! let foo = builder.add_method("Foo", 0x0096)?;
//! builder.add_nested_type(program, "<Foo>d__3", TypeAttributes::NESTED_PRIVATE)?;
//! let move_next = builder.add_method("MoveNext", 0x01E1)?;
//! builder.add_string_attribute(
//!     foo,
//!     "System.Runtime.CompilerServices",
//!     "IteratorStateMachineAttribute",
//!     Some("Demo.Program+<Foo>d__3"),
//! )?;
//!
//! let context = EvaluationContext::from_blocks(&[builder.build().into()])?;
//!
//! // The runtime reports MoveNext, the user wrote Foo
//! let method = context.get_source_method(mvid, move_next)?;
//! assert_eq!(method.name, "Foo");
//! assert_eq!(method.origin.token(), Some(foo));
//! # Ok::<(), evalscope::Error>(())
//! ```

mod builder;
pub mod options;
pub mod statemachine;

pub use builder::{MetadataBlock, ReferencedAssembly, CONTEXT_NAME_PREFIX};
pub use statemachine::MethodOrigin;

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::SymbolKind,
    evaluation::options::CompilationOptions,
    metadata::{
        identity::ModuleId,
        module::LoadedModule,
        tables::TableId,
        token::Token,
        typesystem::{MethodSymbolRc, Symbol, TypeSymbolRc},
    },
    Error, Result,
};

/// A throwaway compilation referencing every module loaded at one debugger stop.
///
/// Modules are looked up by identity through an index built once at construction. If two
/// modules share an MVID, the first one handed to the assembler wins.
pub struct EvaluationContext {
    name: String,
    options: CompilationOptions,
    assemblies: Vec<ReferencedAssembly>,
    index: HashMap<ModuleId, Arc<LoadedModule>>,
}

impl EvaluationContext {
    /// Assembles a context from module snapshots with [`CompilationOptions::default`].
    ///
    /// # Errors
    /// Returns an error if the `Module` row of any block cannot be decoded.
    pub fn from_blocks(blocks: &[MetadataBlock]) -> Result<Self> {
        Self::from_blocks_with_options(blocks, CompilationOptions::default())
    }

    /// Assembles a context from module snapshots with the given options.
    ///
    /// # Errors
    /// Returns an error if the `Module` row of any block cannot be decoded.
    pub fn from_blocks_with_options(
        blocks: &[MetadataBlock],
        options: CompilationOptions,
    ) -> Result<Self> {
        let assembled = builder::assemble(blocks, &options)?;

        Ok(EvaluationContext {
            name: builder::unique_name(),
            options,
            assemblies: assembled.assemblies,
            index: assembled.index,
        })
    }

    /// The generated, process-unique name of this context
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options this context was created with
    #[must_use]
    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    /// The referenced assemblies, in load order of their manifest modules
    #[must_use]
    pub fn assemblies(&self) -> &[ReferencedAssembly] {
        &self.assemblies
    }

    /// Every module of every referenced assembly
    pub fn modules(&self) -> impl Iterator<Item = &Arc<LoadedModule>> {
        self.assemblies
            .iter()
            .flat_map(|assembly| assembly.modules().iter())
    }

    /// Looks up the module with identity `id`, or `None` if it is not loaded.
    #[must_use]
    pub fn find_module(&self, id: ModuleId) -> Option<&Arc<LoadedModule>> {
        self.index.get(&id)
    }

    /// Looks up the module with identity `id`.
    ///
    /// # Errors
    /// Returns [`Error::ModuleNotFound`] if no module with that identity is loaded.
    pub fn module(&self, id: ModuleId) -> Result<&Arc<LoadedModule>> {
        self.find_module(id).ok_or(Error::ModuleNotFound(id))
    }

    /// Resolves a `TypeDef` token of module `id`.
    ///
    /// # Errors
    /// - [`Error::ModuleNotFound`] if the module is not loaded
    /// - [`Error::TokenKindMismatch`] / [`Error::RowOutOfRange`] for a bad token
    #[tracing::instrument(skip(self), fields(context = %self.name))]
    pub fn get_type(&self, id: ModuleId, token: Token) -> Result<TypeSymbolRc> {
        self.module(id)?.resolve_type(token)
    }

    /// Resolves a `MethodDef` token of module `id` exactly as stored in metadata.
    ///
    /// State-machine step methods are returned as they are; see
    /// [`EvaluationContext::get_source_method`].
    ///
    /// # Errors
    /// - [`Error::ModuleNotFound`] if the module is not loaded
    /// - [`Error::TokenKindMismatch`] / [`Error::RowOutOfRange`] for a bad token
    #[tracing::instrument(skip(self), fields(context = %self.name))]
    pub fn get_method(&self, id: ModuleId, token: Token) -> Result<MethodSymbolRc> {
        self.module(id)?.resolve_method(token)
    }

    /// Resolves a `MethodDef` token of module `id` to the method the user wrote.
    ///
    /// For the `MoveNext` method of an iterator or `async` state machine this is the user
    /// method the state machine was generated from, provided the metadata proves it. Any
    /// other method is returned unchanged.
    ///
    /// # Errors
    /// - [`Error::ModuleNotFound`] if the module is not loaded
    /// - [`Error::TokenKindMismatch`] / [`Error::RowOutOfRange`] for a bad token
    pub fn get_source_method(&self, id: ModuleId, token: Token) -> Result<MethodSymbolRc> {
        self.resolve_source_method(id, token)
            .map(MethodOrigin::into_method)
    }

    /// Like [`EvaluationContext::get_source_method`], reporting how the method was found.
    ///
    /// # Errors
    /// - [`Error::ModuleNotFound`] if the module is not loaded
    /// - [`Error::TokenKindMismatch`] / [`Error::RowOutOfRange`] for a bad token
    #[tracing::instrument(skip(self), fields(context = %self.name))]
    pub fn resolve_source_method(&self, id: ModuleId, token: Token) -> Result<MethodOrigin> {
        let module = self.module(id)?;
        let method = module.resolve_method(token)?;
        statemachine::resolve_origin(module, &method)
    }

    /// Resolves a token of either kind; methods go through origin recovery.
    ///
    /// # Errors
    /// - [`Error::ModuleNotFound`] if the module is not loaded
    /// - [`Error::TokenKindMismatch`] if the token is neither a `TypeDef` nor a `MethodDef`
    /// - [`Error::RowOutOfRange`] if the row does not exist
    pub fn resolve(&self, id: ModuleId, token: Token) -> Result<Symbol> {
        match token.table_id() {
            Some(TableId::TypeDef) => self.get_type(id, token).map(Symbol::Type),
            Some(TableId::MethodDef) => self.get_source_method(id, token).map(Symbol::Method),
            _ => {
                // Absent modules are reported before bad tokens
                self.module(id)?;
                Err(Error::TokenKindMismatch {
                    token,
                    expected: SymbolKind::TypeOrMethod,
                })
            }
        }
    }
}
