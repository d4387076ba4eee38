//! In-memory metadata tables.
//!
//! [`crate::metadata::image::MetadataImage`] is a [`crate::metadata::reader::MetadataReader`]
//! over rows held in memory. Hosts that already decoded a module's tables can copy the few
//! tables the resolver needs into an image instead of implementing the reader trait
//! themselves; tests and benchmarks use it to describe modules without a PE file.
//!
//! Images are assembled with [`crate::metadata::image::MetadataImageBuilder`], which keeps the
//! `TypeDef` method ranges and the `NestedClass` table consistent.
//!
//! # Examples
//!
//! ```rust
//! use evalscope::metadata::{
//!     identity::ModuleId,
//!     image::MetadataImageBuilder,
//!     reader::MetadataReader,
//!     tables::{TableId, TypeAttributes},
//! };
//!
//! let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([1; 16]));
//! builder.assembly("Demo");
//! let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
//! let main = builder.add_method("Main", 0x0096)?;
//! let image = builder.build();
//!
//! assert_eq!(image.row_count(TableId::MethodDef), 1);
//! assert_eq!(image.declaring_type(main.row())?, program.row());
//! # Ok::<(), evalscope::Error>(())
//! ```

mod builder;

pub use builder::MetadataImageBuilder;

use std::collections::HashMap;

use crate::{
    metadata::{
        reader::MetadataReader,
        tables::{AssemblyRow, CustomAttributeRow, MethodDefRow, ModuleRow, TableId, TypeDefRow},
        token::Token,
    },
    Result,
};

/// Metadata tables of one module, held in memory.
#[derive(Clone)]
pub struct MetadataImage {
    module: ModuleRow,
    assembly: Option<AssemblyRow>,
    files: Vec<String>,
    types: Vec<TypeDefRow>,
    methods: Vec<MethodDefRow>,
    /// `NestedClass` rows as (nested, enclosing) pairs, in table order
    nested_classes: Vec<(u32, u32)>,
    enclosing: HashMap<u32, u32>,
    attributes: HashMap<Token, Vec<CustomAttributeRow>>,
    attribute_count: u32,
}

impl MetadataImage {
    fn row<'a, T>(rows: &'a [T], row: u32, table: TableId) -> Result<&'a T> {
        if row == 0 {
            return Err(malformed_error!("Row 0 of table {} requested", table));
        }

        rows.get(row as usize - 1).ok_or_else(|| {
            malformed_error!(
                "Row {} of table {} requested - table has {} rows",
                row,
                table,
                rows.len()
            )
        })
    }
}

impl MetadataReader for MetadataImage {
    fn module(&self) -> Result<ModuleRow> {
        Ok(self.module.clone())
    }

    fn assembly(&self) -> Option<AssemblyRow> {
        self.assembly.clone()
    }

    fn files(&self) -> Vec<String> {
        self.files.clone()
    }

    fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::Module => 1,
            TableId::TypeDef => self.types.len() as u32,
            TableId::MethodDef => self.methods.len() as u32,
            TableId::NestedClass => self.nested_classes.len() as u32,
            TableId::CustomAttribute => self.attribute_count,
            TableId::Assembly => u32::from(self.assembly.is_some()),
            TableId::File => self.files.len() as u32,
            _ => 0,
        }
    }

    fn type_def(&self, row: u32) -> Result<TypeDefRow> {
        Self::row(&self.types, row, TableId::TypeDef).cloned()
    }

    fn method_def(&self, row: u32) -> Result<MethodDefRow> {
        Self::row(&self.methods, row, TableId::MethodDef).cloned()
    }

    fn enclosing_type(&self, type_row: u32) -> Option<u32> {
        self.enclosing.get(&type_row).copied()
    }

    fn nested_types(&self, type_row: u32) -> Vec<u32> {
        self.nested_classes
            .iter()
            .filter(|(_, enclosing)| *enclosing == type_row)
            .map(|(nested, _)| *nested)
            .collect()
    }

    fn custom_attributes(&self, parent: Token) -> Vec<CustomAttributeRow> {
        self.attributes.get(&parent).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{identity::ModuleId, tables::TypeAttributes},
        Error,
    };

    #[test]
    fn method_ranges_follow_type_order() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([3; 16]));
        let first = builder.add_type("Demo", "First", TypeAttributes::PUBLIC);
        builder.add_method("A", 0x0006).unwrap();
        builder.add_method("B", 0x0006).unwrap();
        let empty = builder.add_type("Demo", "Empty", TypeAttributes::PUBLIC);
        let last = builder.add_type("Demo", "Last", TypeAttributes::PUBLIC);
        builder.add_method("C", 0x0006).unwrap();
        let image = builder.build();

        assert_eq!(image.method_range(first.row()).unwrap(), 1..3);
        assert_eq!(image.method_range(empty.row()).unwrap(), 3..3);
        assert_eq!(image.method_range(last.row()).unwrap(), 3..4);

        assert_eq!(image.declaring_type(1).unwrap(), first.row());
        assert_eq!(image.declaring_type(2).unwrap(), first.row());
        assert_eq!(image.declaring_type(3).unwrap(), last.row());
        assert!(image.declaring_type(4).is_err());
        assert!(image.declaring_type(0).is_err());
    }

    #[test]
    fn nested_class_table() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([3; 16]));
        let outer = builder.add_type("Demo", "Outer", TypeAttributes::PUBLIC);
        let inner = builder
            .add_nested_type(outer, "Inner", TypeAttributes::NESTED_PUBLIC)
            .unwrap();
        let image = builder.build();

        assert_eq!(image.enclosing_type(inner.row()), Some(outer.row()));
        assert_eq!(image.enclosing_type(outer.row()), None);
        assert_eq!(image.nested_types(outer.row()), vec![inner.row()]);
        assert_eq!(image.row_count(TableId::NestedClass), 1);
    }

    #[test]
    fn missing_rows_are_malformed() {
        let builder = MetadataImageBuilder::new("Demo.dll", ModuleId::from_bytes([3; 16]));
        let image = builder.build();

        assert!(matches!(image.type_def(0), Err(Error::Malformed { .. })));
        assert!(matches!(image.method_def(1), Err(Error::Malformed { .. })));
        assert_eq!(image.row_count(TableId::Assembly), 0);
        assert!(image.assembly().is_none());
    }
}
