//! JOIN algorithm implementations.
//!
//! Both algorithms implement the same equi-join contract: null keys never
//! match on either side, every matching pair appears once per occurrence,
//! and output rows follow left-relation order.

mod hash;
mod nested;

pub use hash::HashJoin;
pub use nested::NestedLoopJoin;
