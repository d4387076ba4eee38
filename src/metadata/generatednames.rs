//! Recognition of compiler-generated metadata names.
//!
//! When the C# compiler lowers lambdas, iterators and `async` methods it emits synthetic types,
//! methods and fields whose names cannot be written in source. They share one shape:
//!
//! ```text
//! <SourceName>K__Suffix         e.g. <Foo>d__3, <>c__DisplayClass0_0, <Value>k__BackingField
//! CS$<SourceName>K__Suffix      older prefix form
//! ```
//!
//! The single character `K` right after the bracketed part selects the
//! [`crate::metadata::generatednames::GeneratedNameKind`]. Brackets may nest
//! (`<<Main>b__0>d`), so the closing bracket is found by balancing. For names of synthetic
//! *types*, any `.` of the source name (explicit interface implementations such as
//! `IEnumerable.GetEnumerator`) is stored as `-` and restored when parsing.
//!
//! Parsing yields a candidate only. The origin resolver always confirms a candidate against
//! the state-machine attributes before trusting it.

/// Prefix used by older compilers in front of the bracketed part
const LEGACY_PREFIX: &str = "CS$<";

/// Character that replaces `.` inside generated type names
const DOT_REPLACEMENT_IN_TYPE_NAMES: char = '-';

/// Kind of a compiler-generated name, keyed by the character following the closing `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum GeneratedNameKind {
    /// `<>1__state`
    StateMachineStateField,
    /// `<>2__current`
    IteratorCurrentBackingField,
    /// `<>3__param`
    StateMachineParameterProxyField,
    /// `<>4__this`
    ThisProxyField,
    /// `<local>5__1`
    HoistedLocalField,
    /// `<>7__wrap1`
    ReusableHoistedLocalField,
    /// `CS$<>8__locals0`
    DisplayClassLocalOrField,
    /// `<>9__0_0`
    LambdaCacheField,
    /// `<Main>b__0_0`
    LambdaMethod,
    /// `<>c__DisplayClass0_0`
    LambdaDisplayClass,
    /// `<Foo>d__3`, the type implementing an iterator or `async` method
    StateMachineType,
    /// `<buffer>e__FixedBuffer`
    FixedBufferField,
    /// `<>f__AnonymousType0`
    AnonymousType,
    /// `<Main>g__Local|0_0`
    LocalFunction,
    /// `<>h__TransparentIdentifier0`
    TransparentIdentifier,
    /// `<Name>i__Field`
    AnonymousTypeField,
    /// `<Value>k__BackingField`
    AutoPropertyBackingField,
    /// `<>l__initialThreadId`
    IteratorCurrentThreadIdField,
    /// `<>m__Finally1`
    IteratorFinallyMethod,
    /// `<>n__0`
    BaseMethodWrapper,
    /// `<>o__0`
    DynamicCallSiteContainerType,
    /// `<>p__0`
    DynamicCallSiteField,
    /// `<>s__1`
    HoistedSynthesizedLocalField,
    /// `<>t__builder`
    AsyncBuilderField,
    /// `<>u__1`
    AwaiterField,
}

impl GeneratedNameKind {
    /// Maps a kind character to its kind.
    ///
    /// Characters outside `1-9` and `a-z`, and unassigned characters inside those ranges,
    /// yield `None`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c {
            '1' => GeneratedNameKind::StateMachineStateField,
            '2' => GeneratedNameKind::IteratorCurrentBackingField,
            '3' => GeneratedNameKind::StateMachineParameterProxyField,
            '4' => GeneratedNameKind::ThisProxyField,
            '5' => GeneratedNameKind::HoistedLocalField,
            '7' => GeneratedNameKind::ReusableHoistedLocalField,
            '8' => GeneratedNameKind::DisplayClassLocalOrField,
            '9' => GeneratedNameKind::LambdaCacheField,
            'b' => GeneratedNameKind::LambdaMethod,
            'c' => GeneratedNameKind::LambdaDisplayClass,
            'd' => GeneratedNameKind::StateMachineType,
            'e' => GeneratedNameKind::FixedBufferField,
            'f' => GeneratedNameKind::AnonymousType,
            'g' => GeneratedNameKind::LocalFunction,
            'h' => GeneratedNameKind::TransparentIdentifier,
            'i' => GeneratedNameKind::AnonymousTypeField,
            'k' => GeneratedNameKind::AutoPropertyBackingField,
            'l' => GeneratedNameKind::IteratorCurrentThreadIdField,
            'm' => GeneratedNameKind::IteratorFinallyMethod,
            'n' => GeneratedNameKind::BaseMethodWrapper,
            'o' => GeneratedNameKind::DynamicCallSiteContainerType,
            'p' => GeneratedNameKind::DynamicCallSiteField,
            's' => GeneratedNameKind::HoistedSynthesizedLocalField,
            't' => GeneratedNameKind::AsyncBuilderField,
            'u' => GeneratedNameKind::AwaiterField,
            _ => return None,
        };
        Some(kind)
    }

    /// The kind character
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            GeneratedNameKind::StateMachineStateField => '1',
            GeneratedNameKind::IteratorCurrentBackingField => '2',
            GeneratedNameKind::StateMachineParameterProxyField => '3',
            GeneratedNameKind::ThisProxyField => '4',
            GeneratedNameKind::HoistedLocalField => '5',
            GeneratedNameKind::ReusableHoistedLocalField => '7',
            GeneratedNameKind::DisplayClassLocalOrField => '8',
            GeneratedNameKind::LambdaCacheField => '9',
            GeneratedNameKind::LambdaMethod => 'b',
            GeneratedNameKind::LambdaDisplayClass => 'c',
            GeneratedNameKind::StateMachineType => 'd',
            GeneratedNameKind::FixedBufferField => 'e',
            GeneratedNameKind::AnonymousType => 'f',
            GeneratedNameKind::LocalFunction => 'g',
            GeneratedNameKind::TransparentIdentifier => 'h',
            GeneratedNameKind::AnonymousTypeField => 'i',
            GeneratedNameKind::AutoPropertyBackingField => 'k',
            GeneratedNameKind::IteratorCurrentThreadIdField => 'l',
            GeneratedNameKind::IteratorFinallyMethod => 'm',
            GeneratedNameKind::BaseMethodWrapper => 'n',
            GeneratedNameKind::DynamicCallSiteContainerType => 'o',
            GeneratedNameKind::DynamicCallSiteField => 'p',
            GeneratedNameKind::HoistedSynthesizedLocalField => 's',
            GeneratedNameKind::AsyncBuilderField => 't',
            GeneratedNameKind::AwaiterField => 'u',
        }
    }

    /// Returns true for kinds that name synthetic types, whose embedded source names use
    /// `-` in place of `.`
    #[must_use]
    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            GeneratedNameKind::LambdaDisplayClass
                | GeneratedNameKind::StateMachineType
                | GeneratedNameKind::DynamicCallSiteContainerType
        )
    }
}

/// A successfully parsed generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedName {
    /// Kind selected by the character after the closing bracket
    pub kind: GeneratedNameKind,
    /// Byte offset of the opening `<`
    pub open_bracket: usize,
    /// Byte offset of the matching `>`
    pub close_bracket: usize,
}

/// Parses `name` as a compiler-generated name.
///
/// Returns `None` for ordinary names, unbalanced brackets, a missing kind character, or a
/// kind character outside the known set.
///
/// # Examples
///
/// ```rust
/// use evalscope::metadata::generatednames::{try_parse_generated_name, GeneratedNameKind};
///
/// let parsed = try_parse_generated_name("<Foo>d__3").unwrap();
/// assert_eq!(parsed.kind, GeneratedNameKind::StateMachineType);
/// assert_eq!((parsed.open_bracket, parsed.close_bracket), (0, 4));
///
/// assert!(try_parse_generated_name("Program").is_none());
/// ```
#[must_use]
pub fn try_parse_generated_name(name: &str) -> Option<GeneratedName> {
    let open_bracket = if name.starts_with(LEGACY_PREFIX) {
        LEGACY_PREFIX.len() - 1
    } else if name.starts_with('<') {
        0
    } else {
        return None;
    };

    let close_bracket = index_of_balanced_bracket(name, open_bracket)?;
    let kind_char = name[close_bracket + 1..].chars().next()?;
    if !matches!(kind_char, '1'..='9' | 'a'..='z') {
        return None;
    }

    Some(GeneratedName {
        kind: GeneratedNameKind::from_char(kind_char)?,
        open_bracket,
        close_bracket,
    })
}

/// Recovers the source method name embedded in a generated name.
///
/// With `required` set, names of any other kind are rejected. For type-name kinds the
/// `-` placeholders are turned back into `.`.
///
/// # Examples
///
/// ```rust
/// use evalscope::metadata::generatednames::{try_parse_source_method_name, GeneratedNameKind};
///
/// let required = Some(GeneratedNameKind::StateMachineType);
/// assert_eq!(try_parse_source_method_name("<Foo>d__3", required).as_deref(), Some("Foo"));
/// assert_eq!(
///     try_parse_source_method_name("<System-Collections-IEnumerable-GetEnumerator>d__1", required)
///         .as_deref(),
///     Some("System.Collections.IEnumerable.GetEnumerator")
/// );
/// assert!(try_parse_source_method_name("<Main>b__0_0", required).is_none());
/// ```
#[must_use]
pub fn try_parse_source_method_name(
    generated_name: &str,
    required: Option<GeneratedNameKind>,
) -> Option<String> {
    let parsed = try_parse_generated_name(generated_name)?;
    if required.is_some_and(|kind| kind != parsed.kind) {
        return None;
    }

    let method_name = &generated_name[parsed.open_bracket + 1..parsed.close_bracket];
    if parsed.kind.is_type_name() {
        Some(method_name.replace(DOT_REPLACEMENT_IN_TYPE_NAMES, "."))
    } else {
        Some(method_name.to_string())
    }
}

/// Byte offset of the `>` balancing the `<` at `open`
fn index_of_balanced_bracket(name: &str, open: usize) -> Option<usize> {
    let mut depth = 1_usize;
    for (offset, c) in name[open + 1..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + 1 + offset);
                }
            }
            _ => {}
        }
    }
    None
}
