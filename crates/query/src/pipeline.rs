//! Eager staged query pipeline.
//!
//! A [`Query`] wraps a materialized [`Relation`] together with the declared
//! type of each column. Every stage consumes the previous relation and
//! produces the next one immediately; nothing is deferred. Carrying the
//! column types lets join and grouping stages reject bad keys when the
//! stage is built, instead of silently mismatching during evaluation.

use crate::ast::{AggregateFunc, Predicate, SortKey};
use crate::executor::{
    filter_relation, project_relation, AggregateExecutor, AggregateSpec, FilterExecutor,
    HashJoin, LimitExecutor, ProjectExecutor, Relation, RelationEntry, SortExecutor,
    TopNExecutor,
};
use alloc::vec::Vec;
use core::fmt;
use tabula_core::DataType;

/// Errors raised while building a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A stage referenced a column index past the relation's width.
    ColumnOutOfBounds { index: usize, width: usize },
    /// Join keys with incompatible declared types.
    KeyTypeMismatch { left: DataType, right: DataType },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ColumnOutOfBounds { index, width } => {
                write!(
                    f,
                    "Column index {} out of bounds for relation of width {}",
                    index, width
                )
            }
            QueryError::KeyTypeMismatch { left, right } => {
                write!(f, "Join key type mismatch: {} vs {}", left, right)
            }
        }
    }
}

impl core::error::Error for QueryError {}

/// An eager query over a materialized relation.
#[derive(Clone, Debug)]
pub struct Query {
    relation: Relation,
    types: Vec<DataType>,
}

impl Query {
    /// Creates a query over a relation with the given column types.
    pub fn new(relation: Relation, types: Vec<DataType>) -> Self {
        Self { relation, types }
    }

    /// Returns the declared column types of the current relation.
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Returns the current relation.
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Consumes the query, returning the materialized relation.
    pub fn into_relation(self) -> Relation {
        self.relation
    }

    fn check_column(&self, index: usize) -> Result<(), QueryError> {
        if index >= self.types.len() {
            return Err(QueryError::ColumnOutOfBounds {
                index,
                width: self.types.len(),
            });
        }
        Ok(())
    }

    /// Keeps the rows matching the predicate.
    pub fn filter<P: Predicate>(self, predicate: P) -> Self {
        let relation = FilterExecutor::new(predicate).execute(self.relation);
        Self {
            relation,
            types: self.types,
        }
    }

    /// Keeps the rows matching a closure. Used where the condition is not
    /// expressible as a column-vs-literal predicate (e.g. membership in a
    /// set computed by an earlier pass).
    pub fn filter_with<F>(self, predicate: F) -> Self
    where
        F: Fn(&RelationEntry) -> bool,
    {
        let relation = filter_relation(self.relation, predicate);
        Self {
            relation,
            types: self.types,
        }
    }

    /// Inner equi-join against another query's relation.
    ///
    /// Output columns are the left columns followed by the right columns.
    /// Null keys never match; every matching pair appears once per
    /// occurrence.
    pub fn join(
        self,
        right: Query,
        left_key: usize,
        right_key: usize,
    ) -> Result<Self, QueryError> {
        self.join_inner_or_outer(right, left_key, right_key, false)
    }

    /// Left outer equi-join: unmatched left rows survive with the right
    /// columns padded with Null.
    pub fn left_join(
        self,
        right: Query,
        left_key: usize,
        right_key: usize,
    ) -> Result<Self, QueryError> {
        self.join_inner_or_outer(right, left_key, right_key, true)
    }

    fn join_inner_or_outer(
        self,
        right: Query,
        left_key: usize,
        right_key: usize,
        outer: bool,
    ) -> Result<Self, QueryError> {
        self.check_column(left_key)?;
        right.check_column(right_key)?;

        let left_type = self.types[left_key];
        let right_type = right.types[right_key];
        if left_type != right_type {
            return Err(QueryError::KeyTypeMismatch {
                left: left_type,
                right: right_type,
            });
        }

        let join = HashJoin::new(left_key, right_key, outer);
        let relation = join.execute(self.relation, right.relation);

        let mut types = self.types;
        types.extend(right.types);
        Ok(Self { relation, types })
    }

    /// Maps every row through a transform producing derived columns. The
    /// caller declares the output column types.
    pub fn map<F>(self, types: Vec<DataType>, transform: F) -> Self
    where
        F: Fn(&RelationEntry) -> Vec<tabula_core::Value>,
    {
        let column_count = types.len();
        let relation = project_relation(self.relation, column_count, transform);
        Self { relation, types }
    }

    /// Groups by the key columns and computes one output column per
    /// aggregate spec. Output columns are the keys (in `group_by` order)
    /// followed by the aggregates; groups come out in ascending key order.
    pub fn group_by(
        self,
        group_by: Vec<usize>,
        aggregates: Vec<AggregateSpec>,
    ) -> Result<Self, QueryError> {
        for &key in &group_by {
            self.check_column(key)?;
        }
        for spec in &aggregates {
            if let Some(col) = spec.column {
                self.check_column(col)?;
            }
        }

        let mut types: Vec<DataType> = group_by.iter().map(|&k| self.types[k]).collect();
        for spec in &aggregates {
            types.push(aggregate_output_type(spec, &self.types));
        }

        let relation = AggregateExecutor::new(group_by, aggregates).execute(self.relation);
        Ok(Self { relation, types })
    }

    /// Filters grouped rows. Same mechanics as `filter`; named separately
    /// because it runs over aggregate output columns.
    pub fn having<P: Predicate>(self, predicate: P) -> Self {
        self.filter(predicate)
    }

    /// Stable multi-key sort.
    pub fn order_by(self, keys: Vec<SortKey>) -> Result<Self, QueryError> {
        for key in &keys {
            self.check_column(key.index)?;
        }
        let relation = SortExecutor::new(keys).execute(self.relation);
        Ok(Self {
            relation,
            types: self.types,
        })
    }

    /// Keeps the best `n` rows of each group under the given ordering.
    /// The output is grouped in ascending key order; apply `order_by`
    /// afterwards for a different outer ordering.
    pub fn top_n_per_group(
        self,
        group_by: Vec<usize>,
        order_by: Vec<SortKey>,
        n: usize,
    ) -> Result<Self, QueryError> {
        for &key in &group_by {
            self.check_column(key)?;
        }
        for key in &order_by {
            self.check_column(key.index)?;
        }
        let relation = TopNExecutor::new(group_by, order_by, n).execute(self.relation);
        Ok(Self {
            relation,
            types: self.types,
        })
    }

    /// Keeps at most `limit` rows starting at `offset`.
    pub fn limit(self, limit: usize, offset: usize) -> Self {
        let relation = LimitExecutor::new(limit, offset).execute(self.relation);
        Self {
            relation,
            types: self.types,
        }
    }

    /// Projects the given columns, in order.
    pub fn select(self, columns: Vec<usize>) -> Result<Self, QueryError> {
        for &col in &columns {
            self.check_column(col)?;
        }
        let types: Vec<DataType> = columns.iter().map(|&c| self.types[c]).collect();
        let relation = ProjectExecutor::new(columns).execute(self.relation);
        Ok(Self { relation, types })
    }
}

/// Declared output type of an aggregate column.
fn aggregate_output_type(spec: &AggregateSpec, input_types: &[DataType]) -> DataType {
    match spec.func {
        AggregateFunc::Count => DataType::Int64,
        AggregateFunc::Avg => DataType::Float64,
        AggregateFunc::Sum => match spec.column.map(|c| input_types[c]) {
            Some(DataType::Float64) => DataType::Float64,
            _ => DataType::Int64,
        },
        AggregateFunc::Min | AggregateFunc::Max => spec
            .column
            .map(|c| input_types[c])
            .unwrap_or(DataType::Int64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::predicate::PredicateClone;
    use crate::ast::{ColumnRef, ValuePredicate};
    use alloc::boxed::Box;
    use alloc::vec;
    use tabula_core::{Row, Value};

    // (id, dept_id, salary, join_date, is_active)
    fn employees() -> Query {
        let rows = vec![
            Row::new(
                1,
                vec![
                    Value::Int32(1),
                    Value::Int32(1),
                    Value::Int64(5000),
                    Value::DateTime(100),
                    Value::Boolean(true),
                ],
            ),
            Row::new(
                2,
                vec![
                    Value::Int32(2),
                    Value::Int32(1),
                    Value::Int64(5000),
                    Value::DateTime(200),
                    Value::Boolean(false),
                ],
            ),
            Row::new(
                3,
                vec![
                    Value::Int32(3),
                    Value::Int32(1),
                    Value::Int64(4000),
                    Value::DateTime(300),
                    Value::Boolean(false),
                ],
            ),
        ];
        Query::new(
            Relation::from_rows_owned(rows, vec!["Employees".into()]),
            vec![
                DataType::Int32,
                DataType::Int32,
                DataType::Int64,
                DataType::DateTime,
                DataType::Boolean,
            ],
        )
    }

    // (dept_id, name)
    fn departments() -> Query {
        let rows = vec![
            Row::new(10, vec![Value::Int32(1), Value::String("Eng".into())]),
            Row::new(11, vec![Value::Int32(2), Value::String("Empty".into())]),
        ];
        Query::new(
            Relation::from_rows_owned(rows, vec!["Departments".into()]),
            vec![DataType::Int32, DataType::String],
        )
    }

    #[test]
    fn test_join_tracks_types() {
        let q = employees().join(departments(), 1, 0).unwrap();
        assert_eq!(q.types().len(), 7);
        assert_eq!(q.types()[6], DataType::String);
        assert_eq!(q.relation().len(), 3);
    }

    #[test]
    fn test_join_key_type_mismatch() {
        // Salary (Int64) against dept id (Int32)
        let err = employees().join(departments(), 2, 0).unwrap_err();
        assert_eq!(
            err,
            QueryError::KeyTypeMismatch {
                left: DataType::Int64,
                right: DataType::Int32
            }
        );
    }

    #[test]
    fn test_join_column_out_of_bounds() {
        let err = employees().join(departments(), 9, 0).unwrap_err();
        assert_eq!(err, QueryError::ColumnOutOfBounds { index: 9, width: 5 });
    }

    #[test]
    fn test_left_join_preserves_empty_group() {
        let q = departments().left_join(employees(), 0, 1).unwrap();
        // Eng matches 3 employees, Empty matches none
        assert_eq!(q.relation().len(), 4);
        let last = &q.relation().entries[3];
        assert_eq!(last.get_field(1), Some(&Value::String("Empty".into())));
        assert_eq!(last.get_field(2), Some(&Value::Null));
    }

    #[test]
    fn test_group_by_output_types() {
        let q = employees()
            .group_by(
                vec![1],
                vec![
                    AggregateSpec::count(),
                    AggregateSpec::sum(2),
                    AggregateSpec::avg(2),
                    AggregateSpec::max(3),
                ],
            )
            .unwrap();
        assert_eq!(
            q.types(),
            &[
                DataType::Int32,
                DataType::Int64,
                DataType::Int64,
                DataType::Float64,
                DataType::DateTime
            ]
        );
        assert_eq!(q.relation().len(), 1);
        assert_eq!(
            q.relation().entries[0].row.values(),
            &[
                Value::Int32(1),
                Value::Int64(3),
                Value::Int64(14000),
                Value::Float64(14000.0 / 3.0),
                Value::DateTime(300)
            ]
        );
    }

    #[test]
    fn test_having_filters_groups() {
        // Orders by status: Refunded 1, Delivered 3, Cancelled 2, Pending 2;
        // keep >= 2, then count descending with status ascending on ties
        let rows = vec![
            Row::new(1, vec![Value::String("Refunded".into())]),
            Row::new(2, vec![Value::String("Delivered".into())]),
            Row::new(3, vec![Value::String("Delivered".into())]),
            Row::new(4, vec![Value::String("Delivered".into())]),
            Row::new(5, vec![Value::String("Cancelled".into())]),
            Row::new(6, vec![Value::String("Cancelled".into())]),
            Row::new(7, vec![Value::String("Pending".into())]),
            Row::new(8, vec![Value::String("Pending".into())]),
        ];
        let q = Query::new(
            Relation::from_rows_owned(rows, vec!["Orders".into()]),
            vec![DataType::String],
        )
        .group_by(vec![0], vec![AggregateSpec::count()])
        .unwrap()
        .having(ValuePredicate::ge(
            ColumnRef::new("Orders", "Count", 1),
            Value::Int64(2),
        ))
        .order_by(vec![SortKey::desc(1), SortKey::asc(0)])
        .unwrap();

        let rel = q.into_relation();
        assert_eq!(rel.len(), 3);
        assert_eq!(
            rel.entries[0].get_field(0),
            Some(&Value::String("Delivered".into()))
        );
        // Cancelled and Pending tie at 2; status ascending breaks the tie
        assert_eq!(
            rel.entries[1].get_field(0),
            Some(&Value::String("Cancelled".into()))
        );
        assert_eq!(
            rel.entries[2].get_field(0),
            Some(&Value::String("Pending".into()))
        );
    }

    #[test]
    fn test_top_one_tie_break() {
        // Two employees tie on salary 5000; later join date wins, then
        // lower id would break a full tie.
        let q = employees()
            .top_n_per_group(vec![1], vec![SortKey::desc(2), SortKey::desc(3), SortKey::asc(0)], 1)
            .unwrap();
        let rel = q.into_relation();
        assert_eq!(rel.len(), 1);
        assert_eq!(rel.entries[0].get_field(0), Some(&Value::Int32(2)));
    }

    #[test]
    fn test_conditional_aggregates_in_pipeline() {
        let active = Box::new(ValuePredicate::eq(
            ColumnRef::new("Employees", "IsActive", 4),
            Value::Boolean(true),
        )) as Box<dyn PredicateClone>;
        let inactive = Box::new(ValuePredicate::eq(
            ColumnRef::new("Employees", "IsActive", 4),
            Value::Boolean(false),
        )) as Box<dyn PredicateClone>;

        let q = employees()
            .group_by(
                vec![1],
                vec![
                    AggregateSpec::avg_if(2, active),
                    AggregateSpec::max_if(2, inactive),
                ],
            )
            .unwrap();
        let rel = q.into_relation();
        assert_eq!(
            rel.entries[0].row.values(),
            &[
                Value::Int32(1),
                Value::Float64(5000.0),
                Value::Int64(5000)
            ]
        );
    }

    #[test]
    fn test_select_reorders_types() {
        let q = employees().select(vec![2, 0]).unwrap();
        assert_eq!(q.types(), &[DataType::Int64, DataType::Int32]);
        assert_eq!(
            q.relation().entries[0].row.values(),
            &[Value::Int64(5000), Value::Int32(1)]
        );
    }

    #[test]
    fn test_map_with_derived_column() {
        let q = employees().map(vec![DataType::Int32, DataType::Int64], |entry| {
            let id = entry.get_field(0).cloned().unwrap_or(Value::Null);
            let doubled = entry
                .get_field(2)
                .and_then(|v| v.as_i64())
                .map(|s| Value::Int64(s * 2))
                .unwrap_or(Value::Null);
            vec![id, doubled]
        });
        assert_eq!(q.types().len(), 2);
        assert_eq!(
            q.relation().entries[0].get_field(1),
            Some(&Value::Int64(10000))
        );
    }

    #[test]
    fn test_limit_and_offset() {
        let q = employees().limit(1, 1);
        let rel = q.into_relation();
        assert_eq!(rel.len(), 1);
        assert_eq!(rel.entries[0].get_field(0), Some(&Value::Int32(2)));
    }
}
