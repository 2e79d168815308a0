//! Hash Join implementation.

use crate::executor::{Relation, RelationEntry, SharedTables};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};
use hashbrown::HashMap;
use tabula_core::Value;

/// A wrapper around a Value reference that implements Hash and Eq for use
/// as a HashMap key. This avoids cloning Value during hash table operations.
#[derive(Clone, Copy)]
struct ValueRef<'a>(&'a Value);

impl<'a> Hash for ValueRef<'a> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<'a> PartialEq for ValueRef<'a> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<'a> Eq for ValueRef<'a> {}

/// Hash Join executor.
///
/// Implements the classic hash join algorithm:
/// 1. Build phase: create a hash table over the right relation's key column
/// 2. Probe phase: scan the left relation in order and probe the hash table
///
/// The right relation is always the build side so that output rows follow
/// left-relation order and the left columns come first in combined rows.
pub struct HashJoin {
    /// Column index for the left (probe) relation.
    left_key_index: usize,
    /// Column index for the right (build) relation.
    right_key_index: usize,
    /// Whether this is a left outer join.
    is_outer_join: bool,
}

impl HashJoin {
    /// Creates a new hash join executor.
    pub fn new(left_key_index: usize, right_key_index: usize, is_outer_join: bool) -> Self {
        Self {
            left_key_index,
            right_key_index,
            is_outer_join,
        }
    }

    /// Creates an inner hash join.
    pub fn inner(left_key_index: usize, right_key_index: usize) -> Self {
        Self::new(left_key_index, right_key_index, false)
    }

    /// Creates a left outer hash join.
    pub fn left_outer(left_key_index: usize, right_key_index: usize) -> Self {
        Self::new(left_key_index, right_key_index, true)
    }

    /// Executes the hash join.
    pub fn execute(&self, left: Relation, right: Relation) -> Relation {
        // Build phase: map right key values to entry indices. Null keys
        // are never inserted, so they can never match.
        let mut hash_table: HashMap<ValueRef<'_>, Vec<u32>> =
            HashMap::with_capacity(right.len());

        for (idx, entry) in right.entries.iter().enumerate() {
            if let Some(key_value) = entry.get_field(self.right_key_index) {
                if !key_value.is_null() {
                    hash_table
                        .entry(ValueRef(key_value))
                        .or_default()
                        .push(idx as u32);
                }
            }
        }

        let right_col_count = right.column_count;
        let total_col_count = left.column_count + right_col_count;

        // Pre-compute combined tables once (shared via Arc)
        let combined_tables: SharedTables = {
            let mut t = left.tables.clone();
            t.extend(right.tables.iter().cloned());
            Arc::from(t)
        };

        let mut result_entries = Vec::with_capacity(left.len());

        for left_entry in left.entries.iter() {
            let key_value = left_entry.get_field(self.left_key_index);
            let mut matched = false;

            if let Some(kv) = key_value {
                if !kv.is_null() {
                    if let Some(right_indices) = hash_table.get(&ValueRef(kv)) {
                        matched = true;
                        for &right_idx in right_indices {
                            let right_entry = &right.entries[right_idx as usize];
                            result_entries.push(RelationEntry::combine(
                                left_entry,
                                right_entry,
                                Arc::clone(&combined_tables),
                            ));
                        }
                    }
                }
            }

            // Left outer join: emit unmatched left entries padded with nulls
            if self.is_outer_join && !matched {
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
    use tabula_core::Row;

    fn employees() -> Relation {
        Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int32(1), Value::Int32(10)]),
                Row::new(2, vec![Value::Int32(2), Value::Int32(10)]),
                Row::new(3, vec![Value::Int32(3), Value::Int32(20)]),
                Row::new(4, vec![Value::Int32(4), Value::Null]),
            ],
            vec!["Employees".into()],
        )
    }

    fn departments() -> Relation {
        Relation::from_rows_owned(
            vec![
                Row::new(10, vec![Value::Int32(10), Value::String("Eng".into())]),
                Row::new(20, vec![Value::Int32(20), Value::String("Sales".into())]),
                Row::new(30, vec![Value::Int32(30), Value::String("Empty".into())]),
            ],
            vec!["Departments".into()],
        )
    }

    #[test]
    fn test_inner_join_matches() {
        let join = HashJoin::inner(1, 0);
        let result = join.execute(employees(), departments());

        // Null department key on employee 4 never matches
        assert_eq!(result.len(), 3);
        assert_eq!(result.column_count, 4);
        // Left order preserved
        assert_eq!(result.entries[0].get_field(0), Some(&Value::Int32(1)));
        assert_eq!(result.entries[1].get_field(0), Some(&Value::Int32(2)));
        assert_eq!(result.entries[2].get_field(0), Some(&Value::Int32(3)));
        assert_eq!(
            result.entries[2].get_field(3),
            Some(&Value::String("Sales".into()))
        );
    }

    #[test]
    fn test_left_outer_join_pads_nulls() {
        let join = HashJoin::left_outer(1, 0);
        let result = join.execute(employees(), departments());

        assert_eq!(result.len(), 4);
        // Employee 4 has a null key: kept, padded with nulls
        assert_eq!(result.entries[3].get_field(0), Some(&Value::Int32(4)));
        assert_eq!(result.entries[3].get_field(2), Some(&Value::Null));
        assert_eq!(result.entries[3].get_field(3), Some(&Value::Null));
    }

    #[test]
    fn test_left_outer_preserves_unmatched_left_side() {
        // Departments on the left: Empty has no employees
        let join = HashJoin::left_outer(0, 1);
        let result = join.execute(departments(), employees());

        // Eng matches 2 employees, Sales 1, Empty none => 4 rows
        assert_eq!(result.len(), 4);
        assert_eq!(
            result.entries[3].get_field(1),
            Some(&Value::String("Empty".into()))
        );
        assert_eq!(result.entries[3].get_field(2), Some(&Value::Null));
    }

    #[test]
    fn test_join_multiplicity() {
        // Two left rows with the same key, two right rows with that key
        let left = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int32(7)]),
                Row::new(2, vec![Value::Int32(7)]),
            ],
            vec!["L".into()],
        );
        let right = Relation::from_rows_owned(
            vec![
                Row::new(3, vec![Value::Int32(7)]),
                Row::new(4, vec![Value::Int32(7)]),
            ],
            vec!["R".into()],
        );

        let result = HashJoin::inner(0, 0).execute(left, right);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_null_keys_never_match_each_other() {
        let left = Relation::from_rows_owned(
            vec![Row::new(1, vec![Value::Null])],
            vec!["L".into()],
        );
        let right = Relation::from_rows_owned(
            vec![Row::new(2, vec![Value::Null])],
            vec!["R".into()],
        );

        let result = HashJoin::inner(0, 0).execute(left, right);
        assert!(result.is_empty());
    }

    #[test]
    fn test_join_with_empty_right() {
        let result = HashJoin::left_outer(1, 0).execute(
            employees(),
            Relation::new(vec!["Departments".into()], 2),
        );
        assert_eq!(result.len(), 4);
        for entry in result.iter() {
            assert_eq!(entry.get_field(2), Some(&Value::Null));
        }
    }
}
