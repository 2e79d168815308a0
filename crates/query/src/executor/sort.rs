//! Sort executor.

use crate::ast::{SortKey, SortOrder};
use crate::executor::{Relation, RelationEntry};
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Sort executor - stable multi-key sort.
///
/// Keys are compared in order; equal rows keep their input order, so ties
/// are broken deterministically by whatever order the previous stage
/// produced.
pub struct SortExecutor {
    order_by: Vec<SortKey>,
}

impl SortExecutor {
    /// Creates a new sort executor.
    pub fn new(order_by: Vec<SortKey>) -> Self {
        Self { order_by }
    }

    /// Executes the sort on the input relation.
    pub fn execute(&self, mut input: Relation) -> Relation {
        let keys = &self.order_by;
        input
            .entries
            .sort_by(|a, b| compare_entries(a, b, keys));
        input
    }
}

/// Compares two entries under a multi-key ordering. Missing fields sort
/// before present ones; `Value`'s total order puts Null first ascending.
pub fn compare_entries(a: &RelationEntry, b: &RelationEntry, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let a_val = a.get_field(key.index);
        let b_val = b.get_field(key.index);

        let cmp = match (a_val, b_val) {
            (Some(av), Some(bv)) => av.cmp(bv),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        if cmp != Ordering::Equal {
            return match key.order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            };
        }
    }
    Ordering::Equal
}
