//! Expression building blocks: column references, sort keys and
//! aggregate functions.

use alloc::string::String;

/// Reference to a column in a relation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name (or alias).
    pub table: String,
    /// Column name.
    pub column: String,
    /// Column index in the relation.
    pub index: usize,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>, index: usize) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            index,
        }
    }

    /// Returns the normalized name (table.column).
    pub fn normalized_name(&self) -> String {
        alloc::format!("{}.{}", self.table, self.column)
    }
}

/// Sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A single sort key: the column index to compare and its direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Column index in the relation.
    pub index: usize,
    /// Sort direction for this key.
    pub order: SortOrder,
}

impl SortKey {
    /// Ascending sort on the given column.
    pub fn asc(index: usize) -> Self {
        Self {
            index,
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on the given column.
    pub fn desc(index: usize) -> Self {
        Self {
            index,
            order: SortOrder::Desc,
        }
    }
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}
