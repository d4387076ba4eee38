use bitflags::bitflags;

use crate::evaluation::options::MetadataImportOptions;

/// Bitmask for access flags in method attributes
pub const METHOD_ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method access flags.
    ///
    /// These are an enumeration stored in three bits rather than independent flags; compare
    /// with `==` after [`MethodAccessFlags::from_method_flags`].
    pub struct MethodAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// Extract access flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !METHOD_ACCESS_MASK)
    }
}

/// The `MethodDef` table row (ECMA-335 II.22.26), with heap indexes already resolved.
///
/// The owning type is not a column of the row; it is implied by the `method_list` ranges of
/// the `TypeDef` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefRow {
    /// Raw `MethodAttributes` bits
    pub flags: u32,
    /// Method name, e.g. `MoveNext` or `Foo`
    pub name: String,
    /// Names of the generic parameters declared by this method, in ordinal order
    pub generic_params: Vec<String>,
}

impl MethodDefRow {
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

    /// Returns true if a method with this access level is imported under `options`
    #[must_use]
    pub fn is_imported(&self, options: MetadataImportOptions) -> bool {
        let access = self.access();
        if access == MethodAccessFlags::PUBLIC
            || access == MethodAccessFlags::FAMILY
            || access == MethodAccessFlags::FAM_OR_ASSEM
        {
            true
        } else if access == MethodAccessFlags::ASSEM || access == MethodAccessFlags::FAM_AND_ASSEM
        {
            options != MetadataImportOptions::Public
        } else {
            options == MetadataImportOptions::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(flags: u32) -> MethodDefRow {
        MethodDefRow {
            flags,
            name: "Foo".to_string(),
            generic_params: Vec::new(),
        }
    }

    #[test]
    fn access_and_modifiers() {
        let method = row(0x0001 | 0x0010 | 0x0080);
        assert_eq!(method.access(), MethodAccessFlags::PRIVATE);
        assert!(method.modifiers().contains(MethodModifiers::STATIC));
        assert!(method.modifiers().contains(MethodModifiers::HIDE_BY_SIG));
        assert!(!method.modifiers().contains(MethodModifiers::VIRTUAL));
    }

    #[test]
    fn import_filter() {
        assert!(!row(0x0001).is_imported(MetadataImportOptions::Internal));
        assert!(row(0x0001).is_imported(MetadataImportOptions::All));
        assert!(row(0x0003).is_imported(MetadataImportOptions::Internal));
        assert!(!row(0x0003).is_imported(MetadataImportOptions::Public));
        assert!(row(0x0006).is_imported(MetadataImportOptions::Public));
        assert!(!row(0x0000).is_imported(MetadataImportOptions::Internal));
    }
}
