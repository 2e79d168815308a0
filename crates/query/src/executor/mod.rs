//! Query executor module.
//!
//! Each executor consumes a materialized [`Relation`] and produces a new
//! one; the pipeline in [`crate::pipeline`] chains them.

mod aggregate;
mod filter;
pub mod join;
mod limit;
mod project;
mod relation;
mod sort;
mod topn;

pub use aggregate::{AggregateExecutor, AggregateSpec};
pub use filter::{filter_relation, FilterExecutor};
pub use join::{HashJoin, NestedLoopJoin};
pub use limit::LimitExecutor;
pub use project::{project_relation, ProjectExecutor};
pub use relation::{Relation, RelationEntry, SharedTables};
pub use sort::{compare_entries, SortExecutor};
pub use topn::TopNExecutor;
