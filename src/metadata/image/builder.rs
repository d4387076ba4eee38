use std::collections::HashMap;

use crate::{
    file::parser::write_compressed_uint,
    metadata::{
        identity::ModuleId,
        image::MetadataImage,
        tables::{AssemblyRow, CustomAttributeRow, MethodDefRow, ModuleRow, TableId, TypeDefRow},
        token::Token,
    },
    Result,
};

/// Builder for [`MetadataImage`].
///
/// Rows are appended in table order. A method always belongs to the most recently added
/// type, which mirrors how compilers emit the `TypeDef` method ranges: add a type, then all
/// of its methods, then the next type.
///
/// # Examples
///
/// ```rust
/// use evalscope::metadata::{
///     identity::ModuleId,
///     image::MetadataImageBuilder,
///     tables::TypeAttributes,
/// };
///
/// let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([1; 16]));
/// builder.assembly("Demo");
///
/// let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
/// let foo = builder.add_method("Foo", 0x0091)?;
///
/// let state_machine = builder.add_nested_type(
///     program,
///     "<Foo>d__3",
///     TypeAttributes::NESTED_PRIVATE | TypeAttributes::SEALED,
/// )?;
/// builder.add_method("MoveNext", 0x01E1)?;
///
/// builder.add_string_attribute(
///     foo,
///     "System.Runtime.CompilerServices",
///     "IteratorStateMachineAttribute",
///     Some("Demo.Program+<Foo>d__3"),
/// )?;
///
/// let image = builder.build();
/// # let _ = (image, state_machine);
/// # Ok::<(), evalscope::Error>(())
/// ```
pub struct MetadataImageBuilder {
    module: ModuleRow,
    assembly: Option<AssemblyRow>,
    files: Vec<String>,
    types: Vec<TypeDefRow>,
    methods: Vec<MethodDefRow>,
    nested_classes: Vec<(u32, u32)>,
    attributes: Vec<CustomAttributeRow>,
}

impl MetadataImageBuilder {
    /// Starts an image for the module `name` with identity `mvid`
    #[must_use]
    pub fn new(name: impl Into<String>, mvid: ModuleId) -> Self {
        MetadataImageBuilder {
            module: ModuleRow {
                name: name.into(),
                mvid,
            },
            assembly: None,
            files: Vec::new(),
            types: Vec::new(),
            methods: Vec::new(),
            nested_classes: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Marks the module as the manifest module of the assembly `name`
    pub fn assembly(&mut self, name: impl Into<String>) -> &mut Self {
        self.assembly = Some(AssemblyRow { name: name.into() });
        self
    }

    /// Adds a `File` row naming a netmodule of this assembly
    pub fn add_file(&mut self, name: impl Into<String>) -> &mut Self {
        self.files.push(name.into());
        self
    }

    /// Adds a top-level type and returns its token
    pub fn add_type(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flags: u32,
    ) -> Token {
        self.types.push(TypeDefRow {
            flags,
            name: name.into(),
            namespace: namespace.into(),
            method_list: self.methods.len() as u32 + 1,
            generic_params: Vec::new(),
        });

        Token::from_parts(TableId::TypeDef, self.types.len() as u32)
    }

    /// Adds a type nested in `enclosing` and returns its token.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `enclosing` is not a type already added.
    pub fn add_nested_type(
        &mut self,
        enclosing: Token,
        name: impl Into<String>,
        flags: u32,
    ) -> Result<Token> {
        let enclosing_row = self.type_row(enclosing)?;
        let token = self.add_type("", name, flags);
        self.nested_classes.push((token.row(), enclosing_row));

        Ok(token)
    }

    /// Adds a method to the most recently added type and returns its token.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no type has been added yet.
    pub fn add_method(&mut self, name: impl Into<String>, flags: u32) -> Result<Token> {
        if self.types.is_empty() {
            return Err(malformed_error!("A method requires a declaring type"));
        }

        self.methods.push(MethodDefRow {
            flags,
            name: name.into(),
            generic_params: Vec::new(),
        });

        Ok(Token::from_parts(
            TableId::MethodDef,
            self.methods.len() as u32,
        ))
    }

    /// Declares the generic parameters of a type or method.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `owner` is neither a type nor a method already added.
    pub fn generic_params(&mut self, owner: Token, names: &[&str]) -> Result<()> {
        let names: Vec<String> = names.iter().map(|name| (*name).to_string()).collect();

        if owner.is_table(TableId::MethodDef) {
            let row = owner.row() as usize;
            match self.methods.get_mut(row.wrapping_sub(1)) {
                Some(method) => method.generic_params = names,
                None => return Err(malformed_error!("Unknown method - {}", owner)),
            }
        } else {
            let row = self.type_row(owner)?;
            self.types[row as usize - 1].generic_params = names;
        }

        Ok(())
    }

    /// Applies an attribute whose single fixed argument is a string (or a `System.Type`,
    /// which is encoded the same way). `None` encodes a null argument.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the value is too long to encode.
    pub fn add_string_attribute(
        &mut self,
        parent: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Option<&str>,
    ) -> Result<()> {
        // Prolog
        let mut blob = vec![0x01, 0x00];
        match value {
            Some(value) => {
                write_compressed_uint(value.len() as u32, &mut blob)?;
                blob.extend_from_slice(value.as_bytes());
            }
            None => blob.push(0xFF),
        }
        // No named arguments
        blob.extend_from_slice(&[0x00, 0x00]);

        self.add_attribute_blob(parent, namespace, name, blob);
        Ok(())
    }

    /// Applies an attribute with an arbitrary, possibly malformed, value blob
    pub fn add_attribute_blob(
        &mut self,
        parent: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Vec<u8>,
    ) {
        self.attributes.push(CustomAttributeRow {
            parent,
            type_namespace: namespace.into(),
            type_name: name.into(),
            value,
        });
    }

    /// Finishes the image
    #[must_use]
    pub fn build(self) -> MetadataImage {
        let enclosing = self.nested_classes.iter().copied().collect();

        let attribute_count = self.attributes.len() as u32;
        let mut attributes: HashMap<Token, Vec<CustomAttributeRow>> = HashMap::new();
        for attribute in self.attributes {
            attributes.entry(attribute.parent).or_default().push(attribute);
        }

        MetadataImage {
            module: self.module,
            assembly: self.assembly,
            files: self.files,
            types: self.types,
            methods: self.methods,
            nested_classes: self.nested_classes,
            enclosing,
            attributes,
            attribute_count,
        }
    }

    fn type_row(&self, token: Token) -> Result<u32> {
        if !token.is_table(TableId::TypeDef)
            || token.row() == 0
            || token.row() as usize > self.types.len()
        {
            return Err(malformed_error!("Unknown type - {}", token));
        }

        Ok(token.row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{reader::MetadataReader, tables::TypeAttributes},
        Parser,
    };

    #[test]
    fn string_attribute_encoding() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([5; 16]));
        builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
        let foo = builder.add_method("Foo", 0x0006).unwrap();
        builder
            .add_string_attribute(foo, "Ns", "Attr", Some("Demo.Program+<Foo>d__3"))
            .unwrap();
        builder.add_string_attribute(foo, "Ns", "Null", None).unwrap();
        let image = builder.build();

        let attributes = image.custom_attributes(foo);
        assert_eq!(attributes.len(), 2);
        assert_eq!(image.row_count(TableId::CustomAttribute), 2);

        let mut parser = Parser::new(&attributes[0].value);
        assert_eq!(parser.read_le::<u16>().unwrap(), 0x0001);
        assert_eq!(
            parser.read_ser_string().unwrap().as_deref(),
            Some("Demo.Program+<Foo>d__3")
        );
        assert_eq!(parser.read_le::<u16>().unwrap(), 0);

        assert_eq!(attributes[1].value, vec![0x01, 0x00, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn generic_params_by_owner() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([5; 16]));
        let list = builder.add_type("Demo", "List`1", TypeAttributes::PUBLIC);
        let map = builder.add_method("Map", 0x0006).unwrap();

        builder.generic_params(list, &["T"]).unwrap();
        builder.generic_params(map, &["U"]).unwrap();
        assert!(builder
            .generic_params(Token::new(0x0600_0009), &["V"])
            .is_err());

        let image = builder.build();
        assert_eq!(image.type_def(list.row()).unwrap().generic_params, ["T"]);
        assert_eq!(image.method_def(map.row()).unwrap().generic_params, ["U"]);
    }

    #[test]
    fn method_without_type() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([5; 16]));
        assert!(builder.add_method("Orphan", 0).is_err());
        assert!(builder
            .add_nested_type(Token::new(0x0200_0001), "Inner", 0)
            .is_err());
    }
}
