//! Query expression types: column references, sort keys, aggregate
//! functions and predicates.

pub mod expr;
pub mod predicate;

pub use expr::{AggregateFunc, ColumnRef, SortKey, SortOrder};
pub use predicate::{
    CombinedPredicate, EvalType, NotPredicate, Predicate, PredicateClone, ValuePredicate,
};
