//! Top-N-per-group executor.

use crate::ast::SortKey;
use crate::executor::sort::compare_entries;
use crate::executor::{Relation, RelationEntry};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use tabula_core::Value;

/// Top-N executor - keeps the best N rows of each group.
///
/// Rows are partitioned by the group key columns, each partition is sorted
/// stably by the order keys, and the first N rows of each partition
/// survive. Partitions are emitted in ascending group-key order. Ties
/// beyond the order keys resolve to the earlier input row, so results are
/// deterministic for any input order.
pub struct TopNExecutor {
    /// Group key column indices.
    group_by: Vec<usize>,
    /// Ordering within each group.
    order_by: Vec<SortKey>,
    /// Rows to keep per group.
    n: usize,
}

impl TopNExecutor {
    /// Creates a new top-N executor.
    pub fn new(group_by: Vec<usize>, order_by: Vec<SortKey>, n: usize) -> Self {
        Self {
            group_by,
            order_by,
            n,
        }
    }

    /// Executes the top-N selection on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let tables = input.tables().to_vec();
        let column_count = input.column_count;

        let mut groups: BTreeMap<Vec<Value>, Vec<RelationEntry>> = BTreeMap::new();
        for entry in input.into_iter() {
            let key: Vec<Value> = self
                .group_by
                .iter()
                .map(|&idx| entry.get_field(idx).cloned().unwrap_or(Value::Null))
                .collect();
            groups.entry(key).or_default().push(entry);
        }

        let mut entries = Vec::new();
        for (_, mut group) in groups {
            group.sort_by(|a, b| compare_entries(a, b, &self.order_by));
            group.truncate(self.n);
            entries.extend(group);
        }

        Relation {
            entries,
            tables,
            column_count,
        }
    }
}
