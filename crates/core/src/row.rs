//! Row structure for the tabula evaluator.
//!
//! This module defines the `Row` struct which represents a single row in an
//! entity collection or a derived (joined/aggregated) tuple.

use crate::value::Value;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a row.
pub type RowId = u64;

/// A dummy row ID used for rows that don't correspond to a stored entity
/// (e.g., the result of joining two rows or an aggregate row).
pub const DUMMY_ROW_ID: RowId = u64::MAX;

/// Global row ID counter for generating unique row IDs.
static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(0);

/// Gets the next unique row ID.
pub fn next_row_id() -> RowId {
    NEXT_ROW_ID.fetch_add(1, Ordering::SeqCst)
}

/// A row of values.
#[derive(Clone, Debug)]
pub struct Row {
    /// Unique identifier for this row.
    id: RowId,
    /// Values stored in this row, indexed by column position.
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given ID and values.
    pub fn new(id: RowId, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Creates a new row with an automatically assigned ID.
    pub fn create(values: Vec<Value>) -> Self {
        Self::new(next_row_id(), values)
    }

    /// Creates a dummy row (for join and aggregate results).
    pub fn dummy(values: Vec<Value>) -> Self {
        Self::new(DUMMY_ROW_ID, values)
    }

    /// Returns the row ID.
    #[inline]
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Gets a value at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the number of values in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if this is a dummy row.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_ROW_ID
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}
