//! Table definition for tabula entity schemas.

use super::column::{Column, ForeignKey};
use crate::error::{Error, Result};
use crate::types::DataType;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A table definition in the entity schema.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
    /// Primary key column names, in declaration order.
    primary_key: Vec<String>,
    /// Foreign key references.
    foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the primary key column names.
    #[inline]
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Returns the foreign key references.
    #[inline]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns the column indices of the primary key.
    pub fn primary_key_indices(&self) -> Vec<usize> {
        self.primary_key
            .iter()
            .filter_map(|name| self.get_column_index(name))
            .collect()
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_schema("Name cannot be empty"));
        }
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Adds a non-nullable column to the table.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                name
            )));
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Adds a nullable column to the table.
    pub fn add_nullable_column(
        self,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Result<Self> {
        let mut builder = self.add_column(name, data_type)?;
        if let Some(col) = builder.columns.last_mut() {
            *col = col.clone().nullable(true);
        }
        Ok(builder)
    }

    /// Sets the primary key. Composite keys list each column in order.
    pub fn primary_key(mut self, columns: &[&str]) -> Result<Self> {
        for name in columns {
            match self.columns.iter().find(|c| c.name() == *name) {
                None => {
                    return Err(Error::invalid_schema(format!("Column not found: {}", name)))
                }
                Some(c) if c.is_nullable() => {
                    return Err(Error::invalid_schema(format!(
                        "Primary key column cannot be nullable: {}",
                        name
                    )))
                }
                _ => {}
            }
        }
        self.primary_key = columns.iter().map(|n| n.to_string()).collect();
        Ok(self)
    }

    /// Adds a foreign key reference.
    pub fn foreign_key(
        mut self,
        column: &str,
        foreign_table: &str,
        foreign_column: &str,
    ) -> Result<Self> {
        if !self.columns.iter().any(|c| c.name() == column) {
            return Err(Error::invalid_schema(format!(
                "Column not found: {}",
                column
            )));
        }
        self.foreign_keys
            .push(ForeignKey::new(column, foreign_table, foreign_column));
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<Table> {
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table has no columns: {}",
                self.name
            )));
        }
        if self.primary_key.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table has no primary key: {}",
                self.name
            )));
        }
        let columns: Vec<Column> = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();
        Ok(Table {
            name: self.name,
            columns,
            primary_key: self.primary_key,
            foreign_keys: self.foreign_keys,
        })
    }
}
