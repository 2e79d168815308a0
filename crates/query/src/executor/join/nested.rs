//! Nested Loop Join implementation.

use crate::executor::{Relation, RelationEntry, SharedTables};
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Nested Loop Join executor.
///
/// The simplest join algorithm that compares every pair of rows. Used as
/// the reference implementation for the equi-join contract; the hash join
/// must produce the same rows in the same order.
pub struct NestedLoopJoin {
    /// Column index for the left relation.
    left_key_index: usize,
    /// Column index for the right relation.
    right_key_index: usize,
    /// Whether this is a left outer join.
    is_outer_join: bool,
}

impl NestedLoopJoin {
    /// Creates a new nested loop join executor.
    pub fn new(left_key_index: usize, right_key_index: usize, is_outer_join: bool) -> Self {
        Self {
            left_key_index,
            right_key_index,
            is_outer_join,
        }
    }

    /// Creates an inner nested loop join.
    pub fn inner(left_key_index: usize, right_key_index: usize) -> Self {
        Self::new(left_key_index, right_key_index, false)
    }

    /// Creates a left outer nested loop join.
    pub fn left_outer(left_key_index: usize, right_key_index: usize) -> Self {
        Self::new(left_key_index, right_key_index, true)
    }

    /// Executes the nested loop join with equality comparison.
    pub fn execute(&self, left: Relation, right: Relation) -> Relation {
        let right_col_count = right.column_count;
        let total_col_count = left.column_count + right_col_count;

        let combined_tables: SharedTables = {
            let mut t = left.tables.clone();
            t.extend(right.tables.iter().cloned());
            Arc::from(t)
        };

        let mut result_entries = Vec::new();

        for left_entry in left.iter() {
            let mut match_found = false;
            let left_value = left_entry.get_field(self.left_key_index);

            // Null keys never match
            if left_value.map(|v| v.is_null()).unwrap_or(true) {
                if self.is_outer_join {
                    result_entries.push(RelationEntry::combine_with_null(
                        left_entry,
                        right_col_count,
                        Arc::clone(&combined_tables),
                    ));
                }
                continue;
            }

            for right_entry in right.iter() {
                if let Some(right_val) = right_entry.get_field(self.right_key_index) {
                    if !right_val.is_null() && left_value == Some(right_val) {
                        match_found = true;
                        result_entries.push(RelationEntry::combine(
                            left_entry,
                            right_entry,
                            Arc::clone(&combined_tables),
                        ));
                    }
                }
            }

            if self.is_outer_join && !match_found {
                result_entries.push(RelationEntry::combine_with_null(
                    left_entry,
                    right_col_count,
                    Arc::clone(&combined_tables),
                ));
            }
        }

        Relation {
            entries: result_entries,
            tables: combined_tables.to_vec(),
            column_count: total_col_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tabula_core::{Row, Value};

    #[test]
    fn test_nested_inner_join() {
        let left = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int32(1), Value::Int32(10)]),
                Row::new(2, vec![Value::Int32(2), Value::Int32(99)]),
            ],
            vec!["L".into()],
        );
        let right = Relation::from_rows_owned(
            vec![Row::new(3, vec![Value::Int32(10), Value::String("x".into())])],
            vec!["R".into()],
        );

        let result = NestedLoopJoin::inner(1, 0).execute(left, right);
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries[0].get_field(0), Some(&Value::Int32(1)));
        assert_eq!(result.entries[0].get_field(3), Some(&Value::String("x".into())));
    }

    #[test]
    fn test_nested_left_outer_join() {
        let left = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int32(10)]),
                Row::new(2, vec![Value::Null]),
            ],
            vec!["L".into()],
        );
        let right = Relation::from_rows_owned(
            vec![Row::new(3, vec![Value::Int32(10)])],
            vec!["R".into()],
        );

        let result = NestedLoopJoin::left_outer(0, 0).execute(left, right);
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[0].get_field(1), Some(&Value::Int32(10)));
        assert_eq!(result.entries[1].get_field(1), Some(&Value::Null));
    }
}
