use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        tables::{TypeAttributes, TypeDefRow},
        typesystem::SymbolOrigin,
    },
    Result,
};

/// Reference to a `TypeSymbol`
pub type TypeSymbolRc = Arc<TypeSymbol>;

/// A type definition, or a constructed instance of a generic definition.
#[derive(Debug)]
pub struct TypeSymbol {
    /// Simple name without generic arity, e.g. `List` or `<Foo>d__3`
    pub name: String,
    /// Name as stored in metadata, e.g. ``List`1``
    pub metadata_name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`)
    pub flags: u32,
    /// Where this type was obtained from; constructed types share their definition's origin
    pub origin: SymbolOrigin,
    /// Generic parameter names of the definition
    pub generic_params: Vec<String>,
    /// Generic arguments, empty unless this is a constructed type
    pub generic_args: Vec<TypeSymbolRc>,
    containing: Option<TypeSymbolRc>,
    definition: Option<TypeSymbolRc>,
}

impl TypeSymbol {
    /// Create a type definition symbol from its decoded row
    #[must_use]
    pub fn from_row(
        row: TypeDefRow,
        origin: SymbolOrigin,
        containing: Option<TypeSymbolRc>,
    ) -> Self {
        TypeSymbol {
            name: strip_arity(&row.name).to_string(),
            metadata_name: row.name,
            namespace: row.namespace,
            flags: row.flags,
            origin,
            generic_params: row.generic_params,
            generic_args: Vec::new(),
            containing,
            definition: None,
        }
    }

    /// Instantiates the generic definition behind `definition` with `args`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the number of arguments does not match the
    /// number of generic parameters.
    pub fn construct(definition: &TypeSymbolRc, args: Vec<TypeSymbolRc>) -> Result<TypeSymbolRc> {
        let definition = definition.original_definition();
        if definition.generic_params.is_empty() || definition.generic_params.len() != args.len() {
            return Err(malformed_error!(
                "Type {} takes {} generic arguments, {} given",
                definition,
                definition.generic_params.len(),
                args.len()
            ));
        }

        Ok(Arc::new(TypeSymbol {
            name: definition.name.clone(),
            metadata_name: definition.metadata_name.clone(),
            namespace: definition.namespace.clone(),
            flags: definition.flags,
            origin: definition.origin,
            generic_params: definition.generic_params.clone(),
            generic_args: args,
            containing: definition.containing.clone(),
            definition: Some(definition),
        }))
    }

    /// The definition this type was constructed from, or the type itself
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> TypeSymbolRc {
        match &self.definition {
            Some(definition) => definition.clone(),
            None => self.clone(),
        }
    }

    /// The enclosing type of a nested type
    #[must_use]
    pub fn containing_type(&self) -> Option<&TypeSymbolRc> {
        self.containing.as_ref()
    }

    /// Returns true for instances created by [`TypeSymbol::construct`]
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        self.definition.is_some()
    }

    /// Returns true for generic definitions that have not been constructed
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty() && !self.is_constructed()
    }

    /// Returns true if the type is nested in another type
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.containing.is_some()
    }

    /// Returns true for interface definitions
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags & TypeAttributes::INTERFACE != 0
    }

    /// Returns the reflection-style full name (`Namespace.Outer+Inner`), without generic arguments
    #[must_use]
    pub fn fullname(&self) -> String {
        match &self.containing {
            Some(containing) => format!("{}+{}", containing.fullname(), self.metadata_name),
            None if self.namespace.is_empty() => self.metadata_name.clone(),
            None => format!("{}.{}", self.namespace, self.metadata_name),
        }
    }
}

impl PartialEq for TypeSymbol {
    fn eq(&self, other: &Self) -> bool {
        if self.generic_args != other.generic_args {
            return false;
        }

        match (self.origin, other.origin) {
            (SymbolOrigin::Metadata { .. }, _) | (_, SymbolOrigin::Metadata { .. }) => {
                self.origin == other.origin
            }
            _ => {
                self.origin == other.origin
                    && self.metadata_name == other.metadata_name
                    && self.namespace == other.namespace
                    && self.containing == other.containing
            }
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())?;
        if !self.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args.iter().map(ToString::to_string).collect();
            write!(f, "[{}]", args.join(","))?;
        }
        Ok(())
    }
}

/// Removes a trailing generic arity marker (`` `N ``) from a metadata name
fn strip_arity(name: &str) -> &str {
    match name.rfind('`') {
        Some(index)
            if index + 1 < name.len() && name[index + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &name[..index]
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{identity::ModuleId, tables::TableId, token::Token};

    fn symbol(row: u32, namespace: &str, name: &str, params: &[&str]) -> TypeSymbolRc {
        let origin = SymbolOrigin::Metadata {
            module: ModuleId::from_bytes([9; 16]),
            token: Token::from_parts(TableId::TypeDef, row),
        };
        let row = TypeDefRow {
            flags: TypeAttributes::PUBLIC,
            name: name.to_string(),
            namespace: namespace.to_string(),
            method_list: 1,
            generic_params: params.iter().map(|p| (*p).to_string()).collect(),
        };
        Arc::new(TypeSymbol::from_row(row, origin, None))
    }

    #[test]
    fn arity_is_stripped() {
        assert_eq!(strip_arity("List`1"), "List");
        assert_eq!(strip_arity("<GetAsync>d__12`1"), "<GetAsync>d__12");
        assert_eq!(strip_arity("Program"), "Program");
        assert_eq!(strip_arity("Odd`"), "Odd`");
        assert_eq!(strip_arity("Odd`x"), "Odd`x");
    }

    #[test]
    fn construct_links_definition() {
        let list = symbol(1, "Demo", "List`1", &["T"]);
        let item = symbol(2, "Demo", "Item", &[]);

        let constructed = TypeSymbol::construct(&list, vec![item.clone()]).unwrap();
        assert!(constructed.is_constructed());
        assert!(list.is_generic_definition());
        assert!(!constructed.is_generic_definition());
        assert_eq!(constructed.original_definition(), list);
        assert_ne!(*constructed, *list);
        assert_eq!(constructed.to_string(), "Demo.List`1[Demo.Item]");

        // Constructing a constructed type starts again from the definition
        let again = TypeSymbol::construct(&constructed, vec![item]).unwrap();
        assert_eq!(again, constructed);
        assert!(Arc::ptr_eq(&again.original_definition(), &list));
    }

    #[test]
    fn construct_checks_arity() {
        let list = symbol(1, "Demo", "List`1", &["T"]);
        let item = symbol(2, "Demo", "Item", &[]);

        assert!(TypeSymbol::construct(&list, Vec::new()).is_err());
        assert!(TypeSymbol::construct(&item, vec![list]).is_err());
    }

    #[test]
    fn nested_fullname() {
        let program = symbol(1, "Demo", "Program", &[]);
        let origin = SymbolOrigin::Metadata {
            module: ModuleId::from_bytes([9; 16]),
            token: Token::from_parts(TableId::TypeDef, 2),
        };
        let row = TypeDefRow {
            flags: TypeAttributes::NESTED_PRIVATE,
            name: "<Foo>d__3".to_string(),
            namespace: String::new(),
            method_list: 1,
            generic_params: Vec::new(),
        };
        let state_machine = TypeSymbol::from_row(row, origin, Some(program.clone()));

        assert!(state_machine.is_nested());
        assert_eq!(state_machine.containing_type(), Some(&program));
        assert_eq!(state_machine.fullname(), "Demo.Program+<Foo>d__3");
    }
}
