use crate::metadata::token::Token;

/// The `CustomAttribute` table row (ECMA-335 II.22.10), with the constructor already resolved
/// to the attribute type it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttributeRow {
    /// The metadata element the attribute is applied to
    pub parent: Token,
    /// Namespace of the attribute type, e.g. `System.Runtime.CompilerServices`
    pub type_namespace: String,
    /// Name of the attribute type, e.g. `AsyncStateMachineAttribute`
    pub type_name: String,
    /// The raw value blob (prolog, fixed arguments, named arguments)
    pub value: Vec<u8>,
}
