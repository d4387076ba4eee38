//! Reflection-style serialized type names.
//!
//! Custom attributes encode `System.Type` arguments as the type's serialized name:
//!
//! ```text
//! Demo.Program+<Foo>d__3
//! Demo.Outer`1+Inner[[System.Int32, mscorlib]], Demo, Version=1.0.0.0
//! Demo.Weird\+Name
//! ```
//!
//! `+` separates nested type names, a bracketed list carries generic arguments (each argument
//! optionally assembly-qualified inside its own brackets), and a trailing `, Assembly` names the
//! defining assembly. A backslash escapes the next character.

use crate::Result;

/// Array, pointer and by-ref decorations following a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSuffix {
    /// `*`
    Pointer,
    /// `&`
    ByRef,
    /// `[]`, a single-dimensional zero-based array
    SzArray,
    /// `[,]` and wider, with the rank
    Array(u32),
}

/// A parsed serialized type name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializedTypeName {
    /// Namespace of the top-level type, empty for the global namespace
    pub namespace: String,
    /// The top-level type name followed by each nested type name, unescaped
    pub names: Vec<String>,
    /// Generic arguments, in order
    pub generic_args: Vec<SerializedTypeName>,
    /// Decorations in the order they appear
    pub suffixes: Vec<NameSuffix>,
    /// Assembly qualifier, if present (the full display name, trimmed)
    pub assembly: Option<String>,
}

impl SerializedTypeName {
    /// Parses a serialized type name.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the name is empty, brackets are unbalanced or
    /// trailing characters remain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evalscope::metadata::typesystem::SerializedTypeName;
    ///
    /// let name = SerializedTypeName::parse("Demo.Program+<Foo>d__3, Demo")?;
    /// assert_eq!(name.namespace, "Demo");
    /// assert_eq!(name.names, ["Program", "<Foo>d__3"]);
    /// assert_eq!(name.assembly_simple_name(), Some("Demo"));
    /// # Ok::<(), evalscope::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = NameParser {
            chars: text.chars().collect(),
            position: 0,
        };

        let name = parser.assembly_qualified_name(false)?;
        if parser.position != parser.chars.len() {
            return Err(malformed_error!(
                "Unexpected '{}' at offset {} in type name '{}'",
                parser.chars[parser.position],
                parser.position,
                text
            ));
        }

        Ok(name)
    }

    /// The simple assembly name of the qualifier, e.g. `mscorlib` for
    /// `mscorlib, Version=4.0.0.0, Culture=neutral`
    #[must_use]
    pub fn assembly_simple_name(&self) -> Option<&str> {
        self.assembly
            .as_deref()
            .map(|assembly| assembly.split(',').next().unwrap_or(assembly).trim())
    }

    /// The top-level type name
    #[must_use]
    pub fn top_level_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// The nested type names following the top-level name
    #[must_use]
    pub fn nested_names(&self) -> &[String] {
        self.names.get(1..).unwrap_or(&[])
    }
}

struct NameParser {
    chars: Vec<char>,
    position: usize,
}

impl NameParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.position += 1;
                Ok(())
            }
            Some(c) => Err(malformed_error!(
                "Expected '{}' at offset {}, found '{}'",
                expected,
                self.position,
                c
            )),
            None => Err(malformed_error!(
                "Expected '{}' at offset {}, found end of name",
                expected,
                self.position
            )),
        }
    }

    /// `TypeSpec [',' AssemblyName]`; inside an unbracketed generic argument the assembly
    /// qualifier is not allowed since `,` separates the arguments
    fn assembly_qualified_name(&mut self, bracketed_arg: bool) -> Result<SerializedTypeName> {
        let mut name = self.type_spec()?;

        self.skip_whitespace();
        if self.peek() == Some(',') {
            self.position += 1;
            let start = self.position;
            while let Some(c) = self.peek() {
                if bracketed_arg && c == ']' {
                    break;
                }
                self.position += 1;
            }

            let assembly: String = self.chars[start..self.position].iter().collect();
            let assembly = assembly.trim();
            if assembly.is_empty() {
                return Err(malformed_error!("Empty assembly name at offset {}", start));
            }
            name.assembly = Some(assembly.to_string());
        }

        Ok(name)
    }

    fn type_spec(&mut self) -> Result<SerializedTypeName> {
        self.skip_whitespace();

        let (mut top_level, last_dot) = self.simple_name()?;
        let mut name = SerializedTypeName::default();
        if let Some(dot) = last_dot.filter(|dot| *dot > 0) {
            let simple = top_level.split_off(dot + 1);
            top_level.truncate(dot);
            name.namespace = std::mem::replace(&mut top_level, simple);
        }

        let mut names = vec![top_level];
        while self.peek() == Some('+') {
            self.position += 1;
            names.push(self.simple_name()?.0);
        }

        if names[0].is_empty() {
            return Err(malformed_error!(
                "Type name ends in a namespace separator at offset {}",
                self.position
            ));
        }
        name.names = names;

        // A '[' directly after the name opens generic arguments unless it is an array rank
        if self.peek() == Some('[')
            && !matches!(self.chars.get(self.position + 1), Some(']' | ',' | '*'))
        {
            self.position += 1;
            name.generic_args = self.generic_args()?;
        }

        name.suffixes = self.suffixes()?;
        Ok(name)
    }

    fn generic_args(&mut self) -> Result<Vec<SerializedTypeName>> {
        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('[') {
                self.position += 1;
                args.push(self.assembly_qualified_name(true)?);
                self.skip_whitespace();
                self.expect(']')?;
            } else {
                args.push(self.type_spec()?);
            }

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.position += 1,
                Some(']') => {
                    self.position += 1;
                    return Ok(args);
                }
                _ => {
                    return Err(malformed_error!(
                        "Unterminated generic argument list at offset {}",
                        self.position
                    ))
                }
            }
        }
    }

    fn suffixes(&mut self) -> Result<Vec<NameSuffix>> {
        let mut suffixes = Vec::new();
        loop {
            match self.peek() {
                Some('*') => {
                    self.position += 1;
                    suffixes.push(NameSuffix::Pointer);
                }
                Some('&') => {
                    self.position += 1;
                    suffixes.push(NameSuffix::ByRef);
                }
                Some('[') => {
                    self.position += 1;
                    let mut rank = 1_u32;
                    loop {
                        match self.peek() {
                            Some(',') => rank += 1,
                            Some('*') => {}
                            Some(']') => break,
                            _ => {
                                return Err(malformed_error!(
                                    "Unterminated array rank at offset {}",
                                    self.position
                                ))
                            }
                        }
                        self.position += 1;
                    }
                    self.position += 1;
                    suffixes.push(if rank == 1 {
                        NameSuffix::SzArray
                    } else {
                        NameSuffix::Array(rank)
                    });
                }
                _ => return Ok(suffixes),
            }
        }
    }

    /// An unescaped name and the byte offset of its last unescaped `.`
    fn simple_name(&mut self) -> Result<(String, Option<usize>)> {
        let start = self.position;
        let mut name = String::new();
        let mut last_dot = None;

        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.position += 1;
                    match self.peek() {
                        Some(escaped) => name.push(escaped),
                        None => {
                            return Err(malformed_error!(
                                "Dangling escape at the end of a type name"
                            ))
                        }
                    }
                }
                '+' | ',' | '[' | ']' | '*' | '&' => break,
                '.' => {
                    last_dot = Some(name.len());
                    name.push(c);
                }
                _ => name.push(c),
            }
            self.position += 1;
        }

        let name = name.trim_end().to_string();
        if name.is_empty() {
            return Err(malformed_error!("Empty type name at offset {}", start));
        }

        Ok((name, last_dot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_names() {
        let name = SerializedTypeName::parse("Demo.Program+<Foo>d__3").unwrap();
        assert_eq!(name.namespace, "Demo");
        assert_eq!(name.top_level_name(), "Program");
        assert_eq!(name.nested_names(), ["<Foo>d__3"]);
        assert!(name.assembly.is_none());
        assert!(name.generic_args.is_empty());
    }

    #[test]
    fn global_namespace_and_dotted_namespace() {
        let name = SerializedTypeName::parse("Program").unwrap();
        assert_eq!(name.namespace, "");
        assert_eq!(name.names, ["Program"]);

        let name = SerializedTypeName::parse("A.B.C.Type`2").unwrap();
        assert_eq!(name.namespace, "A.B.C");
        assert_eq!(name.names, ["Type`2"]);
    }

    #[test]
    fn generic_arguments() {
        let name = SerializedTypeName::parse(
            "Demo.Outer`1+<Run>d__0[[System.Int32, mscorlib, Version=4.0.0.0], Demo.Item], Demo, Version=1.0.0.0",
        )
        .unwrap();

        assert_eq!(name.names, ["Outer`1", "<Run>d__0"]);
        assert_eq!(name.assembly_simple_name(), Some("Demo"));
        assert_eq!(name.generic_args.len(), 2);
        assert_eq!(name.generic_args[0].names, ["Int32"]);
        assert_eq!(name.generic_args[0].namespace, "System");
        assert_eq!(name.generic_args[0].assembly_simple_name(), Some("mscorlib"));
        assert_eq!(name.generic_args[1].namespace, "Demo");
        assert_eq!(name.generic_args[1].names, ["Item"]);
        assert!(name.generic_args[1].assembly.is_none());
    }

    #[test]
    fn suffixes() {
        let name = SerializedTypeName::parse("Demo.Item[][,]*&").unwrap();
        assert_eq!(
            name.suffixes,
            [
                NameSuffix::SzArray,
                NameSuffix::Array(2),
                NameSuffix::Pointer,
                NameSuffix::ByRef
            ]
        );
        assert!(name.generic_args.is_empty());
    }

    #[test]
    fn escapes() {
        let name = SerializedTypeName::parse(r"Demo.Odd\+Name+In\,ner").unwrap();
        assert_eq!(name.names, ["Odd+Name", "In,ner"]);
    }

    #[test]
    fn escaped_dot_is_not_a_namespace_separator() {
        let name = SerializedTypeName::parse(r"Demo.Odd\.Name").unwrap();
        assert_eq!(name.namespace, "Demo");
        assert_eq!(name.names, ["Odd.Name"]);

        let name = SerializedTypeName::parse(r"Odd\.Name+In\.ner").unwrap();
        assert_eq!(name.namespace, "");
        assert_eq!(name.names, ["Odd.Name", "In.ner"]);
    }

    #[test]
    fn malformed() {
        for text in [
            "",
            "Demo.",
            "Demo.Program+",
            "List`1[[X]",
            "List`1[X",
            "A]",
            "A, ",
            "A\\",
            "A[,",
        ] {
            assert!(SerializedTypeName::parse(text).is_err(), "{text}");
        }
    }
}
