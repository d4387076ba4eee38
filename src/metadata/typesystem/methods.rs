use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        tables::{MethodAccessFlags, MethodDefRow, MethodModifiers},
        typesystem::{SymbolOrigin, TypeSymbolRc},
    },
    Result,
};

/// Reference to a `MethodSymbol`
pub type MethodSymbolRc = Arc<MethodSymbol>;

/// A method definition, viewed as a member of its containing type.
///
/// When the containing type is a constructed generic instance, the method is a distinct
/// symbol that links back to the definition on the generic definition.
#[derive(Debug)]
pub struct MethodSymbol {
    /// Method name, e.g. `MoveNext`
    pub name: String,
    /// Raw `MethodAttributes` bits
    pub flags: u32,
    /// Where this method was obtained from
    pub origin: SymbolOrigin,
    /// Generic parameter names declared by the method itself
    pub generic_params: Vec<String>,
    /// The type this method is a member of
    pub containing_type: TypeSymbolRc,
    definition: Option<MethodSymbolRc>,
}

impl MethodSymbol {
    /// Create a method definition symbol from its decoded row
    #[must_use]
    pub fn from_row(
        row: MethodDefRow,
        origin: SymbolOrigin,
        containing_type: TypeSymbolRc,
    ) -> Self {
        MethodSymbol {
            name: row.name,
            flags: row.flags,
            origin,
            generic_params: row.generic_params,
            containing_type,
            definition: None,
        }
    }

    /// The same method as a member of `ty`, which must be an instance of (or be) the
    /// definition's containing type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `ty` is not an instance of the containing type.
    pub fn as_member_of(self: &Arc<Self>, ty: &TypeSymbolRc) -> Result<MethodSymbolRc> {
        let definition = self.original_definition();
        if ty.original_definition() != definition.containing_type.original_definition() {
            return Err(malformed_error!(
                "Method {} is not a member of {}",
                definition,
                ty
            ));
        }

        if !ty.is_constructed() {
            return Ok(definition);
        }

        Ok(Arc::new(MethodSymbol {
            name: definition.name.clone(),
            flags: definition.flags,
            origin: definition.origin,
            generic_params: definition.generic_params.clone(),
            containing_type: ty.clone(),
            definition: Some(definition),
        }))
    }

    /// The definition this method was derived from, or the method itself
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> MethodSymbolRc {
        match &self.definition {
            Some(definition) => definition.clone(),
            None => self.clone(),
        }
    }

    /// Access level of the method
    #[must_use]
    pub fn access(&self) -> MethodAccessFlags {
        MethodAccessFlags::from_method_flags(self.flags)
    }

    /// Modifier bits of the method
    #[must_use]
    pub fn modifiers(&self) -> MethodModifiers {
        MethodModifiers::from_method_flags(self.flags)
    }

    /// Returns true for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers().contains(MethodModifiers::STATIC)
    }

    /// Returns true if the method declares its own generic parameters
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

impl PartialEq for MethodSymbol {
    fn eq(&self, other: &Self) -> bool {
        match (self.origin, other.origin) {
            (SymbolOrigin::Metadata { .. }, _) | (_, SymbolOrigin::Metadata { .. }) => {
                self.origin == other.origin && self.containing_type == other.containing_type
            }
            _ => {
                self.origin == other.origin
                    && self.name == other.name
                    && self.containing_type == other.containing_type
            }
        }
    }
}

impl fmt::Display for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.containing_type, self.name)
    }
}
