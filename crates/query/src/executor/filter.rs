//! Filter executor.

use crate::ast::Predicate;
use crate::executor::{Relation, RelationEntry};
use alloc::vec::Vec;

/// Filter executor - filters rows based on a predicate.
pub struct FilterExecutor<P: Predicate> {
    predicate: P,
}

impl<P: Predicate> FilterExecutor<P> {
    /// Creates a new filter executor.
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }

    /// Executes the filter on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let tables = input.tables().to_vec();
        let column_count = input.column_count;
        let entries: Vec<RelationEntry> = input
            .into_iter()
            .filter(|entry| self.predicate.eval(&entry.row))
            .collect();

        Relation {
            entries,
            tables,
            column_count,
        }
    }
}

/// Filters a relation using a closure.
pub fn filter_relation<F>(input: Relation, predicate: F) -> Relation
where
    F: Fn(&RelationEntry) -> bool,
{
    let tables = input.tables().to_vec();
    let column_count = input.column_count;
    let entries: Vec<RelationEntry> = input.into_iter().filter(|e| predicate(e)).collect();

    Relation {
        entries,
        tables,
        column_count,
    }
}
