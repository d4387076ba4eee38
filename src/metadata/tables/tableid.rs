use strum::{EnumCount, EnumIter};

/// Identifiers of the ECMA-335 metadata tables the resolver knows about.
///
/// The numeric values are the table selectors stored in the high byte of a
/// [`crate::metadata::token::Token`]. Only `TypeDef` and `MethodDef` tokens are ever
/// materialized into symbols; the remaining variants exist so that tokens of other
/// kinds can be recognized and rejected with a precise error.
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, strum::Display)]
pub enum TableId {
    /// `Module` table (0x00) - the single row describing this module, including its MVID.
    Module = 0x00,

    /// `TypeRef` table (0x01) - references to types defined elsewhere.
    TypeRef = 0x01,

    /// `TypeDef` table (0x02) - type definitions, ordered so that each type owns a
    /// contiguous run of `MethodDef` rows.
    TypeDef = 0x02,

    /// `Field` table (0x04) - field definitions.
    Field = 0x04,

    /// `MethodDef` table (0x06) - method definitions.
    MethodDef = 0x06,

    /// `Param` table (0x08) - parameter definitions.
    Param = 0x08,

    /// `MemberRef` table (0x0A) - references to members defined elsewhere.
    MemberRef = 0x0A,

    /// `CustomAttribute` table (0x0C) - attribute applications with their value blobs.
    CustomAttribute = 0x0C,

    /// `StandAloneSig` table (0x11)
    StandAloneSig = 0x11,

    /// `TypeSpec` table (0x1B) - constructed type signatures.
    TypeSpec = 0x1B,

    /// `Assembly` table (0x20) - present only in manifest modules.
    Assembly = 0x20,

    /// `AssemblyRef` table (0x23)
    AssemblyRef = 0x23,

    /// `File` table (0x26) - the other files (netmodules) of a multi-module assembly.
    File = 0x26,

    /// `ExportedType` table (0x27)
    ExportedType = 0x27,

    /// `NestedClass` table (0x29) - nested type to enclosing type mapping.
    NestedClass = 0x29,

    /// `GenericParam` table (0x2A)
    GenericParam = 0x2A,

    /// `MethodSpec` table (0x2B) - generic method instantiations.
    MethodSpec = 0x2B,
}

impl TryFrom<u8> for TableId {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(TableId::Module),
            0x01 => Ok(TableId::TypeRef),
            0x02 => Ok(TableId::TypeDef),
            0x04 => Ok(TableId::Field),
            0x06 => Ok(TableId::MethodDef),
            0x08 => Ok(TableId::Param),
            0x0A => Ok(TableId::MemberRef),
            0x0C => Ok(TableId::CustomAttribute),
            0x11 => Ok(TableId::StandAloneSig),
            0x1B => Ok(TableId::TypeSpec),
            0x20 => Ok(TableId::Assembly),
            0x23 => Ok(TableId::AssemblyRef),
            0x26 => Ok(TableId::File),
            0x27 => Ok(TableId::ExportedType),
            0x29 => Ok(TableId::NestedClass),
            0x2A => Ok(TableId::GenericParam),
            0x2B => Ok(TableId::MethodSpec),
            _ => Err(malformed_error!("Unknown table id - 0x{:02x}", value)),
        }
    }
}
