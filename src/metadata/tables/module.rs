use crate::metadata::identity::ModuleId;

/// The `Module` table row (ECMA-335 II.22.30), reduced to what identifies a module.
///
/// Every module has exactly one such row. Its MVID is the identity the runtime reports for
/// the module, which is why the registry decodes it from here instead of storing it separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    /// File name of the module, e.g. `Demo.dll` or `Extra.netmodule`
    pub name: String,
    /// Module version id
    pub mvid: ModuleId,
}

/// The `Assembly` table row (ECMA-335 II.22.2), reduced to the simple assembly name.
///
/// Only manifest modules carry this row; netmodules have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRow {
    /// Simple name of the assembly, e.g. `Demo`
    pub name: String,
}
