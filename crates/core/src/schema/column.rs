//! Column definition for tabula entity schemas.

use crate::types::DataType;
use alloc::string::String;

/// A column definition in a table schema.
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Data type of the column.
    data_type: DataType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Column index in the table (0-based).
    index: usize,
}

impl Column {
    /// Creates a new non-nullable column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            index: 0,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the column index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}

/// A foreign key reference from one table to another.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKey {
    /// Referencing column in the local table.
    column: String,
    /// Referenced table name.
    foreign_table: String,
    /// Referenced column name.
    foreign_column: String,
}

impl ForeignKey {
    /// Creates a new foreign key reference.
    pub fn new(
        column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        }
    }

    /// Returns the referencing column name.
    #[inline]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the referenced table name.
    #[inline]
    pub fn foreign_table(&self) -> &str {
        &self.foreign_table
    }

    /// Returns the referenced column name.
    #[inline]
    pub fn foreign_column(&self) -> &str {
        &self.foreign_column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_new() {
        let col = Column::new("Salary", DataType::Int64);
        assert_eq!(col.name(), "Salary");
        assert_eq!(col.data_type(), DataType::Int64);
        assert!(!col.is_nullable());
    }

    #[test]
    fn test_column_nullable() {
        let col = Column::new("ManagerId", DataType::Int32).nullable(true);
        assert!(col.is_nullable());
    }

    #[test]
    fn test_foreign_key() {
        let fk = ForeignKey::new("DepartmentId", "Departments", "DepartmentId");
        assert_eq!(fk.column(), "DepartmentId");
        assert_eq!(fk.foreign_table(), "Departments");
        assert_eq!(fk.foreign_column(), "DepartmentId");
    }
}
