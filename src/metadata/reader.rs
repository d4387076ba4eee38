//! The boundary between the resolver and whatever decodes the physical metadata tables.
//!
//! The resolver only needs a handful of row-level queries. Hosts implement
//! [`crate::metadata::reader::MetadataReader`] over their own metadata decoder (a debugger
//! usually already has one); [`crate::metadata::image::MetadataImage`] is the in-memory
//! implementation shipped with the crate.
//!
//! All row indexes are 1-based as in ECMA-335. Implementations report rows that do not exist
//! as [`crate::Error::Malformed`]; the token decoder performs its own range checks before
//! asking, so such errors indicate inconsistent tables.

use std::ops::Range;

use crate::{
    metadata::{
        tables::{AssemblyRow, CustomAttributeRow, MethodDefRow, ModuleRow, TableId, TypeDefRow},
        token::Token,
    },
    Result,
};

/// Row-level access to the metadata tables of one module.
///
/// Readers are shared between threads behind an `Arc`, hence the `Send + Sync` bound.
pub trait MetadataReader: Send + Sync {
    /// The `Module` row of this module.
    ///
    /// # Errors
    /// Returns an error if the row cannot be decoded.
    fn module(&self) -> Result<ModuleRow>;

    /// The `Assembly` row, present only for manifest modules
    fn assembly(&self) -> Option<AssemblyRow>;

    /// Names of the files listed in the `File` table (netmodules of a multi-module assembly)
    fn files(&self) -> Vec<String>;

    /// Number of rows present in `table`
    fn row_count(&self, table: TableId) -> u32;

    /// The `TypeDef` row at 1-based index `row`.
    ///
    /// # Errors
    /// Returns an error if the row does not exist or cannot be decoded.
    fn type_def(&self, row: u32) -> Result<TypeDefRow>;

    /// The `MethodDef` row at 1-based index `row`.
    ///
    /// # Errors
    /// Returns an error if the row does not exist or cannot be decoded.
    fn method_def(&self, row: u32) -> Result<MethodDefRow>;

    /// The enclosing `TypeDef` row of `type_row` according to the `NestedClass` table
    fn enclosing_type(&self, type_row: u32) -> Option<u32>;

    /// The `TypeDef` rows directly nested in `type_row`, in `NestedClass` order
    fn nested_types(&self, type_row: u32) -> Vec<u32>;

    /// All custom attributes applied to `parent`, in table order
    fn custom_attributes(&self, parent: Token) -> Vec<CustomAttributeRow>;

    /// The run of `MethodDef` rows owned by `type_row`.
    ///
    /// The run starts at the type's `method_list` and ends where the next type's run starts,
    /// or after the last `MethodDef` row for the last type.
    ///
    /// # Errors
    /// Returns an error if `type_row` does not exist or the ranges are not monotonic.
    fn method_range(&self, type_row: u32) -> Result<Range<u32>> {
        let start = self.type_def(type_row)?.method_list;
        let end = if type_row < self.row_count(TableId::TypeDef) {
            self.type_def(type_row + 1)?.method_list
        } else {
            self.row_count(TableId::MethodDef) + 1
        };

        if start > end {
            return Err(malformed_error!(
                "TypeDef {} has a method list ({}) past its successor's ({})",
                type_row,
                start,
                end
            ));
        }

        Ok(start..end)
    }

    /// The `TypeDef` row owning `method_row`.
    ///
    /// Binary search over the `method_list` column: the owner is the last type whose run
    /// starts at or before the method. Types with empty runs share a start with their
    /// successor and are skipped by taking the last such type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no type owns the method.
    fn declaring_type(&self, method_row: u32) -> Result<u32> {
        let method_count = self.row_count(TableId::MethodDef);
        if method_row == 0 || method_row > method_count {
            return Err(malformed_error!(
                "MethodDef {} does not exist - table has {} rows",
                method_row,
                method_count
            ));
        }

        // Count of types whose run starts at or before method_row
        let mut low = 0_u32;
        let mut high = self.row_count(TableId::TypeDef);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.type_def(mid + 1)?.method_list <= method_row {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        if low == 0 {
            return Err(malformed_error!(
                "MethodDef {} is not owned by any TypeDef",
                method_row
            ));
        }

        Ok(low)
    }
}
