//! The symbol-table view of one loaded module.
//!
//! A [`crate::metadata::module::LoadedModule`] owns the [`crate::metadata::reader::MetadataReader`]
//! of one module snapshot and turns tokens into shared symbols. Decoded symbols are cached per
//! module, keyed by token; the caches are dropped together with the module view, so a new
//! evaluation context always starts from fresh caches.
//!
//! Besides the token decoder proper ([`crate::metadata::module::LoadedModule::resolve_type`],
//! [`crate::metadata::module::LoadedModule::resolve_method`]) the view answers the few queries
//! the state-machine origin resolver needs: members by name, serialized type names and
//! string-valued attributes.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;

use crate::{
    error::SymbolKind,
    evaluation::options::MetadataImportOptions,
    metadata::{
        customattributes::{decode_string_argument, AttributeDescription},
        identity::ModuleId,
        reader::MetadataReader,
        tables::{TableId, TypeDefRow},
        token::Token,
        typesystem::{
            MethodSymbol, MethodSymbolRc, SerializedTypeName, Symbol, SymbolOrigin, TypeSymbol,
            TypeSymbolRc,
        },
    },
    Error, Result,
};

/// Deepest `NestedClass` chain followed before the metadata is considered cyclic
pub const MAX_NESTING_DEPTH: usize = 64;

/// The symbol-table view of one module.
///
/// Exactly one exists per [`ModuleId`] in an evaluation context. The view is `Send + Sync`;
/// concurrent resolutions of the same token converge on one cached symbol.
pub struct LoadedModule {
    id: ModuleId,
    name: String,
    assembly_name: String,
    is_manifest: bool,
    reader: Arc<dyn MetadataReader>,
    import_options: MetadataImportOptions,
    types: DashMap<Token, TypeSymbolRc>,
    methods: DashMap<Token, MethodSymbolRc>,
    /// (namespace, metadata name) of top-level types to their `TypeDef` row
    top_level_types: OnceLock<HashMap<(String, String), u32>>,
}

impl LoadedModule {
    /// Creates the view of the module behind `reader`.
    ///
    /// The identity is decoded from the module's own `Module` row. A netmodule (no `Assembly`
    /// row) reports its module name as assembly name until it is attached to its assembly.
    ///
    /// # Errors
    /// Returns an error if the `Module` row cannot be decoded.
    pub fn new(
        reader: Arc<dyn MetadataReader>,
        import_options: MetadataImportOptions,
    ) -> Result<Self> {
        let module = reader.module()?;
        let assembly = reader.assembly();

        Ok(LoadedModule {
            id: module.mvid,
            is_manifest: assembly.is_some(),
            assembly_name: assembly.map_or_else(|| module.name.clone(), |assembly| assembly.name),
            name: module.name,
            reader,
            import_options,
            types: DashMap::new(),
            methods: DashMap::new(),
            top_level_types: OnceLock::new(),
        })
    }

    /// Records the assembly a netmodule belongs to
    pub(crate) fn attach_to(&mut self, assembly_name: &str) {
        self.assembly_name = assembly_name.to_string();
    }

    /// The module version id
    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// The module's file name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simple name of the assembly this module belongs to
    #[must_use]
    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    /// Returns true if this is the manifest module of its assembly
    #[must_use]
    pub fn is_manifest(&self) -> bool {
        self.is_manifest
    }

    /// The metadata reader this view decodes from
    #[must_use]
    pub fn reader(&self) -> &Arc<dyn MetadataReader> {
        &self.reader
    }

    /// Which members [`LoadedModule::members`] returns
    #[must_use]
    pub fn import_options(&self) -> MetadataImportOptions {
        self.import_options
    }

    /// Resolves a `TypeDef` token to its type symbol, including its enclosing types.
    ///
    /// # Errors
    /// - [`Error::TokenKindMismatch`] if the token does not select the `TypeDef` table
    /// - [`Error::RowOutOfRange`] if the row does not exist
    /// - [`Error::RecursionLimit`] if the enclosing type chain is cyclic
    pub fn resolve_type(&self, token: Token) -> Result<TypeSymbolRc> {
        self.check_token(token, TableId::TypeDef, SymbolKind::Type)?;
        self.type_symbol(token.row(), 0)
    }

    /// Resolves a `MethodDef` token to its method symbol, as a member of its declaring type.
    ///
    /// # Errors
    /// - [`Error::TokenKindMismatch`] if the token does not select the `MethodDef` table
    /// - [`Error::RowOutOfRange`] if the row does not exist
    /// - [`Error::Malformed`] if no type owns the method
    pub fn resolve_method(&self, token: Token) -> Result<MethodSymbolRc> {
        self.check_token(token, TableId::MethodDef, SymbolKind::Method)?;

        if let Some(method) = self.methods.get(&token) {
            tracing::trace!(%token, "method cache hit");
            return Ok(method.value().clone());
        }

        let declaring_row = self.reader.declaring_type(token.row())?;
        let declaring_type = self.type_symbol(declaring_row, 0)?;
        let row = self.reader.method_def(token.row())?;

        let method = Arc::new(MethodSymbol::from_row(
            row,
            self.origin(token),
            declaring_type,
        ));
        Ok(self.methods.entry(token).or_insert(method).value().clone())
    }

    /// Members of `ty` named `name`: methods in declaration order, then nested types.
    ///
    /// Members hidden by the view's [`MetadataImportOptions`] are skipped. For a constructed
    /// type the methods are returned as members of that instance.
    ///
    /// # Errors
    /// Returns [`Error::ModuleMismatch`] if `ty` was not decoded from this module.
    pub fn members(&self, ty: &TypeSymbolRc, name: &str) -> Result<Vec<Symbol>> {
        let type_row = self.own_row(ty.origin, TableId::TypeDef)?;

        let mut members = Vec::new();
        for method_row in self.reader.method_range(type_row)? {
            let row = self.reader.method_def(method_row)?;
            if row.name != name || !row.is_imported(self.import_options) {
                continue;
            }

            let method = self.resolve_method(Token::from_parts(TableId::MethodDef, method_row))?;
            let method = if ty.is_constructed() {
                method.as_member_of(ty)?
            } else {
                method
            };
            members.push(Symbol::Method(method));
        }

        for nested_row in self.reader.nested_types(type_row) {
            let row = self.reader.type_def(nested_row)?;
            if !row.is_imported(self.import_options) {
                continue;
            }

            let nested = self.type_symbol(nested_row, 0)?;
            if nested.name == name {
                members.push(Symbol::Type(nested));
            }
        }

        Ok(members)
    }

    /// Resolves a reflection-style serialized type name within this module only.
    ///
    /// Generic arguments that resolve in this module construct the type; otherwise the
    /// generic definition is returned.
    ///
    /// # Errors
    /// - [`Error::TypeNotFound`] if no type of this module has the name, or the assembly
    ///   qualifier names another assembly
    /// - [`Error::Malformed`] if the name cannot be parsed
    pub fn type_for_serialized_name(&self, name: &str) -> Result<TypeSymbolRc> {
        let parsed = SerializedTypeName::parse(name)?;
        self.resolve_serialized(&parsed)
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))?
    }

    /// Decodes the single string-like argument of the first attribute matching `description`
    /// applied to `method`.
    ///
    /// Returns `Ok(None)` if the attribute is absent or its argument is null.
    ///
    /// # Errors
    /// - [`Error::ModuleMismatch`] if `method` was not decoded from this module
    /// - [`Error::Malformed`] / [`Error::OutOfBounds`] if the attribute blob is damaged
    pub fn string_valued_attribute(
        &self,
        method: &MethodSymbolRc,
        description: AttributeDescription,
    ) -> Result<Option<String>> {
        let method = method.original_definition();
        let row = self.own_row(method.origin, TableId::MethodDef)?;
        let token = Token::from_parts(TableId::MethodDef, row);

        match self
            .reader
            .custom_attributes(token)
            .iter()
            .find(|attribute| description.matches(attribute))
        {
            Some(attribute) => decode_string_argument(&attribute.value),
            None => Ok(None),
        }
    }

    fn check_token(&self, token: Token, table: TableId, expected: SymbolKind) -> Result<()> {
        if !token.is_table(table) {
            return Err(Error::TokenKindMismatch { token, expected });
        }

        let row_count = self.reader.row_count(table);
        if token.row() == 0 || token.row() > row_count {
            return Err(Error::RowOutOfRange { token, row_count });
        }

        Ok(())
    }

    fn origin(&self, token: Token) -> SymbolOrigin {
        SymbolOrigin::Metadata {
            module: self.id,
            token,
        }
    }

    /// Row of a symbol decoded from this module, after checking the table it came from
    fn own_row(&self, origin: SymbolOrigin, table: TableId) -> Result<u32> {
        match origin {
            SymbolOrigin::Metadata { module, token } if module == self.id => {
                if token.is_table(table) {
                    Ok(token.row())
                } else {
                    Err(malformed_error!(
                        "Token {} does not belong to table {}",
                        token,
                        table
                    ))
                }
            }
            SymbolOrigin::Metadata { module, .. } => Err(Error::ModuleMismatch {
                expected: self.id,
                actual: module,
            }),
            other => Err(malformed_error!(
                "Symbol with origin {:?} has no metadata row",
                other
            )),
        }
    }

    fn type_symbol(&self, row: u32, depth: usize) -> Result<TypeSymbolRc> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::RecursionLimit(MAX_NESTING_DEPTH));
        }

        let token = Token::from_parts(TableId::TypeDef, row);
        if let Some(ty) = self.types.get(&token) {
            tracing::trace!(%token, "type cache hit");
            return Ok(ty.value().clone());
        }

        let type_row = self.reader.type_def(row)?;
        let containing = match self.reader.enclosing_type(row) {
            Some(enclosing) => {
                if enclosing == 0 || enclosing > self.reader.row_count(TableId::TypeDef) {
                    return Err(malformed_error!(
                        "TypeDef {} is nested in missing TypeDef {}",
                        row,
                        enclosing
                    ));
                }
                Some(self.type_symbol(enclosing, depth + 1)?)
            }
            None => None,
        };

        let ty = Arc::new(TypeSymbol::from_row(type_row, self.origin(token), containing));
        Ok(self.types.entry(token).or_insert(ty).value().clone())
    }

    fn top_level_types(&self) -> &HashMap<(String, String), u32> {
        self.top_level_types.get_or_init(|| {
            let mut index = HashMap::new();
            for row in 1..=self.reader.row_count(TableId::TypeDef) {
                if self.reader.enclosing_type(row).is_some() {
                    continue;
                }
                if let Ok(TypeDefRow { namespace, name, .. }) = self.reader.type_def(row) {
                    index.entry((namespace, name)).or_insert(row);
                }
            }
            index
        })
    }

    /// `None` if the name does not denote a type of this module
    fn resolve_serialized(&self, name: &SerializedTypeName) -> Option<Result<TypeSymbolRc>> {
        if let Some(assembly) = name.assembly_simple_name() {
            if !assembly.eq_ignore_ascii_case(&self.assembly_name) {
                return None;
            }
        }
        if !name.suffixes.is_empty() {
            return None;
        }

        let key = (name.namespace.clone(), name.top_level_name().to_string());
        let mut row = *self.top_level_types().get(&key)?;

        for nested in name.nested_names() {
            row = self.reader.nested_types(row).into_iter().find(|candidate| {
                self.reader
                    .type_def(*candidate)
                    .is_ok_and(|candidate| candidate.name == *nested)
            })?;
        }

        let definition = match self.type_symbol(row, 0) {
            Ok(definition) => definition,
            Err(e) => return Some(Err(e)),
        };
        if name.generic_args.is_empty() {
            return Some(Ok(definition));
        }

        let mut args = Vec::with_capacity(name.generic_args.len());
        for arg in &name.generic_args {
            match self.resolve_serialized(arg) {
                Some(Ok(arg)) => args.push(arg),
                _ => return Some(Ok(definition)),
            }
        }

        match TypeSymbol::construct(&definition, args) {
            Ok(constructed) => Some(Ok(constructed)),
            Err(_) => Some(Ok(definition)),
        }
    }
}
