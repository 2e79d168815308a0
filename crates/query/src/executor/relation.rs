//! Relation and RelationEntry types for query execution.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use tabula_core::{Row, RowId, Value};

/// Shared table names to avoid repeated cloning during joins.
pub type SharedTables = Arc<[String]>;

/// Internal storage for table names - either owned or shared.
#[derive(Clone, Debug)]
enum TablesStorage {
    /// Owned vector (for single-table entries).
    Owned(Vec<String>),
    /// Shared via Arc (for join results).
    Shared(SharedTables),
}

impl TablesStorage {
    #[inline]
    fn as_slice(&self) -> &[String] {
        match self {
            TablesStorage::Owned(v) => v,
            TablesStorage::Shared(arc) => arc,
        }
    }
}

/// A relation entry wraps a row with table context.
#[derive(Clone, Debug)]
pub struct RelationEntry {
    /// The underlying row (reference counted for efficient sharing).
    pub row: Rc<Row>,
    /// Whether this entry is from a joined relation.
    pub is_combined: bool,
    /// Table names this entry belongs to.
    tables: TablesStorage,
}

impl RelationEntry {
    /// Creates a relation entry with shared tables (avoids cloning for each row).
    #[inline]
    pub fn new_shared(row: Rc<Row>, shared_tables: SharedTables) -> Self {
        Self {
            row,
            is_combined: shared_tables.len() > 1,
            tables: TablesStorage::Shared(shared_tables),
        }
    }

    /// Creates a new relation entry.
    pub fn new(row: Rc<Row>, tables: Vec<String>) -> Self {
        Self {
            row,
            is_combined: tables.len() > 1,
            tables: TablesStorage::Owned(tables),
        }
    }

    /// Creates a relation entry from a single table.
    pub fn from_row(row: Rc<Row>, table: impl Into<String>) -> Self {
        Self {
            row,
            is_combined: false,
            tables: TablesStorage::Owned(alloc::vec![table.into()]),
        }
    }

    /// Creates a relation entry from an owned Row and a single table.
    pub fn from_row_owned(row: Row, table: impl Into<String>) -> Self {
        Self {
            row: Rc::new(row),
            is_combined: false,
            tables: TablesStorage::Owned(alloc::vec![table.into()]),
        }
    }

    /// Returns the row ID.
    pub fn id(&self) -> RowId {
        self.row.id()
    }

    /// Returns the tables this entry belongs to.
    pub fn tables(&self) -> &[String] {
        self.tables.as_slice()
    }

    /// Gets a field value by column index.
    pub fn get_field(&self, index: usize) -> Option<&Value> {
        self.row.get(index)
    }

    /// Combines two entries into a joined entry, concatenating left and
    /// right values.
    #[inline]
    pub fn combine(
        left: &RelationEntry,
        right: &RelationEntry,
        combined_tables: SharedTables,
    ) -> Self {
        let left_values = left.row.values();
        let right_values = right.row.values();

        let mut values = Vec::with_capacity(left_values.len() + right_values.len());
        values.extend(left_values.iter().cloned());
        values.extend(right_values.iter().cloned());

        Self {
            row: Rc::new(Row::dummy(values)),
            is_combined: true,
            tables: TablesStorage::Shared(combined_tables),
        }
    }

    /// Creates a combined entry with null values for the right side (for
    /// unmatched rows of a left outer join).
    #[inline]
    pub fn combine_with_null(
        left: &RelationEntry,
        right_column_count: usize,
        combined_tables: SharedTables,
    ) -> Self {
        let left_values = left.row.values();
        let total_len = left_values.len() + right_column_count;

        let mut values = Vec::with_capacity(total_len);
        values.extend(left_values.iter().cloned());
        values.resize(total_len, Value::Null);

        Self {
            row: Rc::new(Row::dummy(values)),
            is_combined: true,
            tables: TablesStorage::Shared(combined_tables),
        }
    }
}

/// A relation is a materialized collection of entries with table context.
#[derive(Clone, Debug)]
pub struct Relation {
    /// The entries in this relation.
    pub entries: Vec<RelationEntry>,
    /// Table names in this relation.
    pub tables: Vec<String>,
    /// Total number of columns per entry.
    pub column_count: usize,
}

impl Relation {
    /// Creates a new empty relation.
    pub fn new(tables: Vec<String>, column_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            tables,
            column_count,
        }
    }

    /// Creates an empty relation with no tables.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            tables: Vec::new(),
            column_count: 0,
        }
    }

    /// Creates a relation from Rc<Row>s.
    /// Uses shared tables to avoid cloning for each row.
    pub fn from_rows(rows: Vec<Rc<Row>>, tables: Vec<String>) -> Self {
        let shared_tables: SharedTables = Arc::from(tables.as_slice());
        let column_count = rows.first().map(|r| r.len()).unwrap_or(0);
        let entries = rows
            .into_iter()
            .map(|row| RelationEntry::new_shared(row, shared_tables.clone()))
            .collect();
        Self {
            entries,
            tables,
            column_count,
        }
    }

    /// Creates a relation from owned Rows.
    pub fn from_rows_owned(rows: Vec<Row>, tables: Vec<String>) -> Self {
        let rows: Vec<Rc<Row>> = rows.into_iter().map(Rc::new).collect();
        Self::from_rows(rows, tables)
    }

    /// Returns the table names.
    #[inline]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Returns the shared table names for building combined entries.
    pub fn shared_tables(&self) -> SharedTables {
        Arc::from(self.tables.as_slice())
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the relation has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> core::slice::Iter<'_, RelationEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for Relation {
    type Item = RelationEntry;
    type IntoIter = alloc::vec::IntoIter<RelationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
