use crate::evaluation::options::MetadataImportOptions;

#[allow(non_snake_case)]
/// Type attribute flag constants for `TypeDef` entries.
///
/// Only the groups consulted during symbol resolution are listed: visibility, which decides
/// whether a type is nested and whether it is imported, and the semantic bits surfaced on
/// [`crate::metadata::typesystem::TypeSymbol`].
pub mod TypeAttributes {
    /// Mask for extracting type visibility information.
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Type has no public scope (internal to assembly).
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Type has public scope (visible outside assembly).
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested type with public visibility.
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested type with private visibility.
    ///
    /// Compiler-generated state machines and closures are emitted with this visibility.
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Nested type with family (protected) visibility.
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Nested type with assembly (internal) visibility.
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Nested type with family AND assembly visibility.
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Nested type with family OR assembly visibility.
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Type is an interface definition.
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract and cannot be instantiated directly.
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class is sealed and cannot be inherited from.
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name has special meaning to the runtime.
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Runtime should check name encoding.
    pub const RT_SPECIAL_NAME: u32 = 0x0000_0800;
}

/// The `TypeDef` table row (ECMA-335 II.22.37), with heap indexes already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefRow {
    /// A 4-byte bitmask of type [`TypeAttributes`]
    pub flags: u32,
    /// Metadata name, including any generic arity suffix such as `` `1 ``
    pub name: String,
    /// Namespace, empty for nested types and the global namespace
    pub namespace: String,
    /// First row of the run of `MethodDef` rows owned by this type (1-based).
    ///
    /// The run ends where the next type's run starts, or at the end of the table.
    pub method_list: u32,
    /// Names of the generic parameters declared by this type, in ordinal order
    pub generic_params: Vec<String>,
}

impl TypeDefRow {
    /// Returns the visibility bits of [`TypeDefRow::flags`]
    #[must_use]
    pub fn visibility(&self) -> u32 {
        self.flags & TypeAttributes::VISIBILITY_MASK
    }

    /// Returns true if the visibility bits mark this type as nested
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.visibility() >= TypeAttributes::NESTED_PUBLIC
    }

    /// Returns true if a type with this visibility is imported under `options`
    #[must_use]
    pub fn is_imported(&self, options: MetadataImportOptions) -> bool {
        match self.visibility() {
            TypeAttributes::PUBLIC
            | TypeAttributes::NESTED_PUBLIC
            | TypeAttributes::NESTED_FAMILY
            | TypeAttributes::NESTED_FAM_OR_ASSEM => true,
            TypeAttributes::NOT_PUBLIC
            | TypeAttributes::NESTED_ASSEMBLY
            | TypeAttributes::NESTED_FAM_AND_ASSEM => options != MetadataImportOptions::Public,
            _ => options == MetadataImportOptions::All,
        }
    }
}
