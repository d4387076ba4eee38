use thiserror::Error;

use crate::metadata::{identity::ModuleId, token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The kind of symbol a caller asked a metadata token to resolve to.
///
/// Used by [`Error::TokenKindMismatch`] to report what the token's table selector
/// should have been.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SymbolKind {
    /// A type definition (`TypeDef` table, `0x02`)
    Type,
    /// A method definition (`MethodDef` table, `0x06`)
    Method,
    /// Either of the above
    #[strum(to_string = "Type or Method")]
    TypeOrMethod,
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::ModuleNotFound`] - The requested module is not referenced by the evaluation context
/// - [`Error::TokenKindMismatch`] - The token selects a table that does not match the requested symbol kind
/// - [`Error::RowOutOfRange`] - The token's row does not exist in its table
/// - [`Error::ModuleMismatch`] - A symbol from one module was handed to another module's view
/// - [`Error::TypeNotFound`] - A serialized type name could not be resolved
///
/// ## Decoding Errors
/// - [`Error::Malformed`] - Corrupted metadata rows or attribute blobs
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a blob
/// - [`Error::RecursionLimit`] - Nested type chain exceeded the maximum depth
///
/// A state-machine step method whose origin cannot be proven is *not* an error; see
/// [`crate::evaluation::MethodOrigin`].
///
/// # Examples
///
/// ```rust
/// use evalscope::{
///     evaluation::EvaluationContext,
///     metadata::{identity::ModuleId, token::Token},
///     Error,
/// };
///
/// let context = EvaluationContext::from_blocks(&[])?;
/// let missing = ModuleId::from_bytes([7; 16]);
///
/// match context.get_method(missing, Token::new(0x0600_0001)) {
///     Err(Error::ModuleNotFound(id)) => println!("module {id} is no longer loaded"),
///     Err(e) => println!("resolution failed: {e}"),
///     Ok(method) => println!("resolved {}", method.name),
/// }
/// # Ok::<(), evalscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No module with the requested MVID is referenced by the evaluation context.
    ///
    /// This is an expected condition during a debug session: dynamic modules can be
    /// unloaded between the debugger stop and the evaluation request.
    #[error("No module found with MVID '{0}'")]
    ModuleNotFound(ModuleId),

    /// The token's table selector does not match the kind of symbol requested.
    ///
    /// Indicates a stale or corrupted token reported by the runtime.
    #[error("Token {token} does not reference a {expected} definition")]
    TokenKindMismatch {
        /// The offending token
        token: Token,
        /// The kind of symbol that was requested
        expected: SymbolKind,
    },

    /// The token's row index is zero or exceeds the row count of its table.
    #[error("Token {token} is out of range - table has {row_count} rows")]
    RowOutOfRange {
        /// The offending token
        token: Token,
        /// Number of rows present in the selected table
        row_count: u32,
    },

    /// A symbol decoded against one module was used with another module's view.
    ///
    /// Tokens and rows are only meaningful relative to the module they were
    /// decoded against, so this is always rejected.
    #[error("Symbol belongs to module '{actual}', not to module '{expected}'")]
    ModuleMismatch {
        /// The module whose view was asked
        expected: ModuleId,
        /// The module the symbol was decoded from
        actual: ModuleId,
    },

    /// A serialized type name did not resolve to a type definition of the module.
    #[error("Failed to resolve serialized type name '{0}'")]
    TypeNotFound(String),

    /// The metadata or an attribute blob is damaged and could not be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding a blob.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Recursion limit reached.
    ///
    /// Raised while walking enclosing types when the `NestedClass` chain is deeper
    /// than allowed, which only happens for cyclic or hand-crafted metadata.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
