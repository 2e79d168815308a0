//! Aggregate executor.
//!
//! Groups a relation by composite key columns and computes one output
//! column per aggregate spec. A spec may carry its own row filter, which
//! restricts that aggregate to a sub-view of the group without affecting
//! the other aggregates (e.g. the average salary of active employees next
//! to the maximum salary of inactive ones, in a single pass).

use crate::ast::predicate::PredicateClone;
use crate::ast::AggregateFunc;
use crate::executor::{Relation, RelationEntry, SharedTables};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabula_core::{Row, Value};

/// One aggregate output column: the function, the input column it reads
/// (None for COUNT(*)), and an optional row filter.
#[derive(Clone, Debug)]
pub struct AggregateSpec {
    pub func: AggregateFunc,
    pub column: Option<usize>,
    pub filter: Option<Box<dyn PredicateClone>>,
}

impl AggregateSpec {
    /// COUNT(*) - counts all rows in the group.
    pub fn count() -> Self {
        Self {
            func: AggregateFunc::Count,
            column: None,
            filter: None,
        }
    }

    /// COUNT(column) - counts non-null values in the column.
    pub fn count_column(column: usize) -> Self {
        Self {
            func: AggregateFunc::Count,
            column: Some(column),
            filter: None,
        }
    }

    /// COUNT(*) over rows matching the filter.
    pub fn count_if(filter: Box<dyn PredicateClone>) -> Self {
        Self {
            func: AggregateFunc::Count,
            column: None,
            filter: Some(filter),
        }
    }

    pub fn sum(column: usize) -> Self {
        Self {
            func: AggregateFunc::Sum,
            column: Some(column),
            filter: None,
        }
    }

    pub fn sum_if(column: usize, filter: Box<dyn PredicateClone>) -> Self {
        Self {
            func: AggregateFunc::Sum,
            column: Some(column),
            filter: Some(filter),
        }
    }

    pub fn avg(column: usize) -> Self {
        Self {
            func: AggregateFunc::Avg,
            column: Some(column),
            filter: None,
        }
    }

    pub fn avg_if(column: usize, filter: Box<dyn PredicateClone>) -> Self {
        Self {
            func: AggregateFunc::Avg,
            column: Some(column),
            filter: Some(filter),
        }
    }

    pub fn min(column: usize) -> Self {
        Self {
            func: AggregateFunc::Min,
            column: Some(column),
            filter: None,
        }
    }

    pub fn min_if(column: usize, filter: Box<dyn PredicateClone>) -> Self {
        Self {
            func: AggregateFunc::Min,
            column: Some(column),
            filter: Some(filter),
        }
    }

    pub fn max(column: usize) -> Self {
        Self {
            func: AggregateFunc::Max,
            column: Some(column),
            filter: None,
        }
    }

    pub fn max_if(column: usize, filter: Box<dyn PredicateClone>) -> Self {
        Self {
            func: AggregateFunc::Max,
            column: Some(column),
            filter: Some(filter),
        }
    }
}

/// Aggregate executor - computes grouped aggregate functions.
pub struct AggregateExecutor {
    /// Group by column indices (empty for a single global group).
    group_by: Vec<usize>,
    /// Aggregates to compute, one output column each.
    aggregates: Vec<AggregateSpec>,
}

impl AggregateExecutor {
    /// Creates a new aggregate executor.
    pub fn new(group_by: Vec<usize>, aggregates: Vec<AggregateSpec>) -> Self {
        Self {
            group_by,
            aggregates,
        }
    }

    /// Creates an aggregate executor with no grouping.
    pub fn no_group(aggregates: Vec<AggregateSpec>) -> Self {
        Self::new(Vec::new(), aggregates)
    }

    /// Executes the aggregation on the input relation.
    ///
    /// Output rows carry the group key columns first (in `group_by` order),
    /// then one column per aggregate spec. Groups are emitted in ascending
    /// key order.
    pub fn execute(&self, input: Relation) -> Relation {
        let tables = input.tables().to_vec();
        let shared_tables: SharedTables = tables.clone().into();
        let result_column_count = self.group_by.len() + self.aggregates.len();

        if self.group_by.is_empty() {
            // No grouping - aggregate the entire relation as one group
            let all: Vec<&RelationEntry> = input.iter().collect();
            let values = self.compute_aggregates(&all);
            let entry =
                RelationEntry::new_shared(Rc::new(Row::dummy(values)), shared_tables);
            return Relation {
                entries: alloc::vec![entry],
                tables,
                column_count: result_column_count,
            };
        }

        // Group by the key columns. BTreeMap gives ascending key order and
        // Value's total order handles null and mixed-type keys.
        let mut groups: BTreeMap<Vec<Value>, Vec<&RelationEntry>> = BTreeMap::new();

        for entry in input.iter() {
            let key: Vec<Value> = self
                .group_by
                .iter()
                .map(|&idx| entry.get_field(idx).cloned().unwrap_or(Value::Null))
                .collect();
            groups.entry(key).or_default().push(entry);
        }

        let entries: Vec<RelationEntry> = groups
            .into_iter()
            .map(|(key, group_entries)| {
                let mut values = Vec::with_capacity(result_column_count);
                values.extend(key);
                values.extend(self.compute_aggregates(&group_entries));

                RelationEntry::new_shared(Rc::new(Row::dummy(values)), shared_tables.clone())
            })
            .collect();

        Relation {
            entries,
            tables,
            column_count: result_column_count,
        }
    }

    fn compute_aggregates(&self, entries: &[&RelationEntry]) -> Vec<Value> {
        self.aggregates
            .iter()
            .map(|spec| {
                match &spec.filter {
                    Some(filter) => {
                        let filtered: Vec<&RelationEntry> = entries
                            .iter()
                            .copied()
                            .filter(|e| filter.eval(&e.row))
                            .collect();
                        compute_single_aggregate(spec.func, spec.column, &filtered)
                    }
                    None => compute_single_aggregate(spec.func, spec.column, entries),
                }
            })
            .collect()
    }
}

fn compute_single_aggregate(
    func: AggregateFunc,
    col_idx: Option<usize>,
    entries: &[&RelationEntry],
) -> Value {
    match func {
        AggregateFunc::Count => {
            if let Some(idx) = col_idx {
                // COUNT(column) - count non-null values
                let count = entries
                    .iter()
                    .filter(|e| e.get_field(idx).map(|v| !v.is_null()).unwrap_or(false))
                    .count();
                Value::Int64(count as i64)
            } else {
                // COUNT(*) - count all rows
                Value::Int64(entries.len() as i64)
            }
        }
        AggregateFunc::Sum => {
            let idx = col_idx.unwrap_or(0);
            // Integral inputs accumulate exactly in i64; one Float64 input
            // switches the whole sum to f64.
            let mut int_sum: i64 = 0;
            let mut float_sum: f64 = 0.0;
            let mut saw_float = false;
            for value in entries.iter().filter_map(|e| e.get_field(idx)) {
                match value {
                    Value::Int32(v) => int_sum = int_sum.wrapping_add(*v as i64),
                    Value::Int64(v) => int_sum = int_sum.wrapping_add(*v),
                    Value::Float64(v) => {
                        saw_float = true;
                        float_sum += v;
                    }
                    _ => {}
                }
            }
            if saw_float {
                Value::Float64(float_sum + int_sum as f64)
            } else {
                Value::Int64(int_sum)
            }
        }
        AggregateFunc::Avg => {
            let idx = col_idx.unwrap_or(0);
            let values: Vec<f64> = entries
                .iter()
                .filter_map(|e| e.get_field(idx))
                .filter_map(|v| v.as_numeric())
                .collect();

            if values.is_empty() {
                Value::Null
            } else {
                let sum: f64 = values.iter().sum();
                Value::Float64(sum / values.len() as f64)
            }
        }
        AggregateFunc::Min => {
            let idx = col_idx.unwrap_or(0);
            entries
                .iter()
                .filter_map(|e| e.get_field(idx))
                .filter(|v| !v.is_null())
                .min()
                .cloned()
                .unwrap_or(Value::Null)
        }
        AggregateFunc::Max => {
            let idx = col_idx.unwrap_or(0);
            entries
                .iter()
                .filter_map(|e| e.get_field(idx))
                .filter(|v| !v.is_null())
                .max()
                .cloned()
                .unwrap_or(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnRef, ValuePredicate};
    use alloc::vec;

    // (status, amount) rows
    fn orders() -> Relation {
        Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::String("Delivered".into()), Value::Int64(100)]),
                Row::new(2, vec![Value::String("Pending".into()), Value::Int64(50)]),
                Row::new(3, vec![Value::String("Delivered".into()), Value::Int64(200)]),
                Row::new(4, vec![Value::String("Delivered".into()), Value::Int64(300)]),
                Row::new(5, vec![Value::String("Cancelled".into()), Value::Int64(10)]),
                Row::new(6, vec![Value::String("Cancelled".into()), Value::Int64(20)]),
            ],
            vec!["Orders".into()],
        )
    }

    #[test]
    fn test_group_count_and_sum() {
        let executor = AggregateExecutor::new(
            vec![0],
            vec![AggregateSpec::count(), AggregateSpec::sum(1)],
        );
        let result = executor.execute(orders());

        // Ascending key order: Cancelled, Delivered, Pending
        assert_eq!(result.len(), 3);
        assert_eq!(
            result.entries[0].row.values(),
            &[
                Value::String("Cancelled".into()),
                Value::Int64(2),
                Value::Int64(30)
            ]
        );
        assert_eq!(
            result.entries[1].row.values(),
            &[
                Value::String("Delivered".into()),
                Value::Int64(3),
                Value::Int64(600)
            ]
        );
        assert_eq!(
            result.entries[2].row.values(),
            &[
                Value::String("Pending".into()),
                Value::Int64(1),
                Value::Int64(50)
            ]
        );
    }

    #[test]
    fn test_no_group_aggregates_whole_relation() {
        let executor = AggregateExecutor::no_group(vec![
            AggregateSpec::count(),
            AggregateSpec::avg(1),
            AggregateSpec::min(1),
            AggregateSpec::max(1),
        ]);
        let result = executor.execute(orders());

        assert_eq!(result.len(), 1);
        assert_eq!(
            result.entries[0].row.values(),
            &[
                Value::Int64(6),
                Value::Float64(680.0 / 6.0),
                Value::Int64(10),
                Value::Int64(300)
            ]
        );
    }

    #[test]
    fn test_empty_group_identities() {
        let empty = Relation::new(vec!["Orders".into()], 2);
        let executor = AggregateExecutor::no_group(vec![
            AggregateSpec::count(),
            AggregateSpec::sum(1),
            AggregateSpec::avg(1),
            AggregateSpec::min(1),
            AggregateSpec::max(1),
        ]);
        let result = executor.execute(empty);

        assert_eq!(
            result.entries[0].row.values(),
            &[
                Value::Int64(0),
                Value::Int64(0),
                Value::Null,
                Value::Null,
                Value::Null
            ]
        );
    }

    #[test]
    fn test_count_column_skips_nulls() {
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int32(1)]),
                Row::new(2, vec![Value::Null]),
                Row::new(3, vec![Value::Int32(3)]),
            ],
            vec!["t".into()],
        );
        let executor = AggregateExecutor::no_group(vec![
            AggregateSpec::count(),
            AggregateSpec::count_column(0),
        ]);
        let result = executor.execute(input);
        assert_eq!(
            result.entries[0].row.values(),
            &[Value::Int64(3), Value::Int64(2)]
        );
    }

    #[test]
    fn test_conditional_aggregates() {
        // (is_active, salary)
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Boolean(true), Value::Int64(100)]),
                Row::new(2, vec![Value::Boolean(false), Value::Int64(200)]),
                Row::new(3, vec![Value::Boolean(false), Value::Int64(300)]),
            ],
            vec!["Employees".into()],
        );

        let active = || {
            Box::new(ValuePredicate::eq(
                ColumnRef::new("Employees", "IsActive", 0),
                Value::Boolean(true),
            )) as Box<dyn PredicateClone>
        };
        let inactive = || {
            Box::new(ValuePredicate::eq(
                ColumnRef::new("Employees", "IsActive", 0),
                Value::Boolean(false),
            )) as Box<dyn PredicateClone>
        };

        let executor = AggregateExecutor::no_group(vec![
            AggregateSpec::avg_if(1, active()),
            AggregateSpec::max_if(1, inactive()),
            AggregateSpec::count_if(active()),
        ]);
        let result = executor.execute(input);

        assert_eq!(
            result.entries[0].row.values(),
            &[Value::Float64(100.0), Value::Int64(300), Value::Int64(1)]
        );
    }

    #[test]
    fn test_conditional_aggregate_empty_subview() {
        // No active rows: AVG over the empty sub-view is Null
        let input = Relation::from_rows_owned(
            vec![Row::new(1, vec![Value::Boolean(false), Value::Int64(7)])],
            vec!["Employees".into()],
        );
        let active = Box::new(ValuePredicate::eq(
            ColumnRef::new("Employees", "IsActive", 0),
            Value::Boolean(true),
        )) as Box<dyn PredicateClone>;

        let executor = AggregateExecutor::no_group(vec![AggregateSpec::avg_if(1, active)]);
        let result = executor.execute(input);
        assert_eq!(result.entries[0].row.values(), &[Value::Null]);
    }

    #[test]
    fn test_composite_group_key() {
        // (country, status)
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::String("IN".into()), Value::String("D".into())]),
                Row::new(2, vec![Value::String("IN".into()), Value::String("P".into())]),
                Row::new(3, vec![Value::String("IN".into()), Value::String("D".into())]),
                Row::new(4, vec![Value::String("US".into()), Value::String("D".into())]),
            ],
            vec!["t".into()],
        );
        let executor = AggregateExecutor::new(vec![0, 1], vec![AggregateSpec::count()]);
        let result = executor.execute(input);

        assert_eq!(result.len(), 3);
        assert_eq!(
            result.entries[0].row.values(),
            &[
                Value::String("IN".into()),
                Value::String("D".into()),
                Value::Int64(2)
            ]
        );
    }

    #[test]
    fn test_null_group_key_forms_its_own_group() {
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Null, Value::Int64(1)]),
                Row::new(2, vec![Value::Int32(1), Value::Int64(2)]),
                Row::new(3, vec![Value::Null, Value::Int64(3)]),
            ],
            vec!["t".into()],
        );
        let executor = AggregateExecutor::new(vec![0], vec![AggregateSpec::count()]);
        let result = executor.execute(input);

        // Null sorts before any non-null key
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.entries[0].row.values(),
            &[Value::Null, Value::Int64(2)]
        );
    }

    #[test]
    fn test_int_sum_is_exact_beyond_float_precision() {
        // 2^53 + 1 is not representable in f64
        let big = 9_007_199_254_740_993i64;
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int64(big)]),
                Row::new(2, vec![Value::Int64(0)]),
            ],
            vec!["t".into()],
        );
        let executor = AggregateExecutor::no_group(vec![AggregateSpec::sum(0)]);
        let result = executor.execute(input);
        assert_eq!(result.entries[0].row.values(), &[Value::Int64(big)]);
    }

    #[test]
    fn test_sum_promotes_to_float() {
        let input = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int64(1)]),
                Row::new(2, vec![Value::Float64(2.5)]),
            ],
            vec!["t".into()],
        );
        let executor = AggregateExecutor::no_group(vec![AggregateSpec::sum(0)]);
        let result = executor.execute(input);
        assert_eq!(result.entries[0].row.values(), &[Value::Float64(3.5)]);
    }
}
