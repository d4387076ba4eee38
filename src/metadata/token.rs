//! Metadata tokens.
//!
//! A token is the only handle the runtime reports for a type or method: table selector in the
//! high byte, 1-based row in the low 24 bits. Tokens are meaningful relative to exactly one
//! module and must never be compared across modules.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableId;

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Builds a token from a table and a 1-based row index.
    ///
    /// Only the low 24 bits of `row` are kept.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the table this token selects, or `None` for selectors unknown to the resolver
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::try_from(self.table()).ok()
    }

    /// Returns true if the token selects `table`
    #[must_use]
    pub fn is_table(&self, table: TableId) -> bool {
        self.table() == table as u8
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_new() {
        let token = Token::new(0x06000001);
        assert_eq!(token.value(), 0x06000001);
    }

    #[test]
    fn test_token_table() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);

        let token2 = Token(0x02000005);
        assert_eq!(token2.table(), 0x02);

        let token3 = Token(0x00000000);
        assert_eq!(token3.table(), 0x00);
    }

    #[test]
    fn test_token_row() {
        let token = Token(0x06000001);
        assert_eq!(token.row(), 1);

        let token2 = Token(0x02000005);
        assert_eq!(token2.row(), 5);

        let token3 = Token(0x06FFFFFF);
        assert_eq!(token3.row(), 0x00FFFFFF);
    }

    #[test]
    fn test_token_is_null() {
        let null_token = Token(0x00000000);
        assert!(null_token.is_null());

        let non_null_token = Token(0x06000001);
        assert!(!non_null_token.is_null());
    }

    #[test]
    fn test_token_from_conversion() {
        let value = 0x06000001u32;
        let token: Token = value.into();
        assert_eq!(token.value(), value);

        let back_to_u32: u32 = token.into();
        assert_eq!(back_to_u32, value);
    }

    #[test]
    fn test_token_display() {
        let token = Token(0x06000001);
        assert_eq!(format!("{}", token), "0x06000001");

        let token2 = Token(0x00000000);
        assert_eq!(format!("{}", token2), "0x00000000");
    }

    #[test]
    fn test_token_debug() {
        let token = Token(0x06000001);
        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering() {
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);
        let token3 = Token(0x07000001);

        assert!(token1 < token2);
        assert!(token2 < token3);
        assert!(token1 < token3);
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);

        map.insert(token1, "Method1");
        map.insert(token2, "Method2");

        assert_eq!(map.get(&token1), Some(&"Method1"));
        assert_eq!(map.get(&token2), Some(&"Method2"));
    }

    #[test]
    fn test_token_from_parts() {
        let token = Token::from_parts(TableId::MethodDef, 7);
        assert_eq!(token, Token(0x06000007));
        assert_eq!(token.table_id(), Some(TableId::MethodDef));
        assert!(token.is_table(TableId::MethodDef));
        assert!(!token.is_table(TableId::TypeDef));

        // Row bits above 24 are dropped
        let token = Token::from_parts(TableId::TypeDef, 0x0100_0099);
        assert_eq!(token, Token(0x02000099));
    }

    #[test]
    fn test_token_unknown_table() {
        assert_eq!(Token(0x7F000001).table_id(), None);
        assert_eq!(Token(0x02000099).table_id(), Some(TableId::TypeDef));
    }

    #[test]
    fn test_common_token_types() {
        // Test common .NET metadata table tokens

        // TypeDef (0x02)
        let typedef_token = Token(0x02000001);
        assert_eq!(typedef_token.table(), 0x02);
        assert_eq!(typedef_token.row(), 1);

        // MethodDef (0x06)
        let methoddef_token = Token(0x06000001);
        assert_eq!(methoddef_token.table(), 0x06);
        assert_eq!(methoddef_token.row(), 1);

        // TypeRef (0x01)
        let typeref_token = Token(0x01000001);
        assert_eq!(typeref_token.table(), 0x01);
        assert_eq!(typeref_token.row(), 1);

        // MemberRef (0x0A)
        let memberref_token = Token(0x0A000001);
        assert_eq!(memberref_token.table(), 0x0A);
        assert_eq!(memberref_token.row(), 1);
    }
}
