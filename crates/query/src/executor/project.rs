//! Project executor.

use crate::executor::{Relation, RelationEntry, SharedTables};
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabula_core::{Row, Value};

/// Project executor - projects specific columns from rows.
pub struct ProjectExecutor {
    /// Column indices to project, in output order.
    column_indices: Vec<usize>,
}

impl ProjectExecutor {
    /// Creates a new project executor.
    pub fn new(column_indices: Vec<usize>) -> Self {
        Self { column_indices }
    }

    /// Executes the projection on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let tables = input.tables().to_vec();
        let shared_tables: SharedTables = tables.clone().into();
        let entries: Vec<RelationEntry> = input
            .into_iter()
            .map(|entry| {
                let values: Vec<Value> = self
                    .column_indices
                    .iter()
                    .map(|&idx| entry.get_field(idx).cloned().unwrap_or(Value::Null))
                    .collect();
                RelationEntry::new_shared(
                    Rc::new(Row::new(entry.id(), values)),
                    shared_tables.clone(),
                )
            })
            .collect();

        Relation {
            entries,
            tables,
            column_count: self.column_indices.len(),
        }
    }
}

/// Maps each entry through a transformation function, producing a relation
/// with derived columns (e.g. the calendar year of a date column).
pub fn project_relation<F>(input: Relation, column_count: usize, transform: F) -> Relation
where
    F: Fn(&RelationEntry) -> Vec<Value>,
{
    let tables = input.tables().to_vec();
    let shared_tables: SharedTables = tables.clone().into();
    let entries: Vec<RelationEntry> = input
        .into_iter()
        .map(|entry| {
            let values = transform(&entry);
            RelationEntry::new_shared(
                Rc::new(Row::new(entry.id(), values)),
                shared_tables.clone(),
            )
        })
        .collect();

    Relation {
        entries,
        tables,
        column_count,
    }
}
