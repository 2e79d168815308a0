//! Predicate definitions for query filtering.
//!
//! All comparison predicates are null-rejecting: a row whose referenced
//! column holds `Null` fails every comparison, including `Ne`. Null is
//! only observable through the explicit `IsNull` / `IsNotNull` tests.

use crate::ast::expr::ColumnRef;
use alloc::boxed::Box;
use alloc::vec::Vec;
use tabula_core::text::{eq_ignore_case, starts_with_ignore_case};
use tabula_core::{Row, Value};

/// Evaluation type for predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-insensitive string equality.
    EqIgnoreCase,
    /// Case-insensitive string prefix match.
    StartsWith,
    IsNull,
    IsNotNull,
}

/// A predicate that can be evaluated against rows.
pub trait Predicate {
    /// Evaluates the predicate against a row.
    fn eval(&self, row: &Row) -> bool;

    /// Returns the columns referenced by this predicate.
    fn columns(&self) -> Vec<&ColumnRef>;
}

/// Helper trait for cloning boxed predicates.
pub trait PredicateClone: Predicate {
    fn clone_box(&self) -> Box<dyn PredicateClone>;
}

impl<T: Predicate + Clone + 'static> PredicateClone for T {
    fn clone_box(&self) -> Box<dyn PredicateClone> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn PredicateClone> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl core::fmt::Debug for Box<dyn PredicateClone> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PredicateClone")
    }
}

/// A value predicate compares a column to a literal value.
#[derive(Clone, Debug)]
pub struct ValuePredicate {
    pub column: ColumnRef,
    pub eval_type: EvalType,
    pub value: Value,
}

impl ValuePredicate {
    pub fn new(column: ColumnRef, eval_type: EvalType, value: Value) -> Self {
        Self {
            column,
            eval_type,
            value,
        }
    }

    pub fn eq(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Eq, value)
    }

    pub fn ne(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Ne, value)
    }

    pub fn lt(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Lt, value)
    }

    pub fn le(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Le, value)
    }

    pub fn gt(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Gt, value)
    }

    pub fn ge(column: ColumnRef, value: Value) -> Self {
        Self::new(column, EvalType::Ge, value)
    }

    pub fn eq_ignore_case(column: ColumnRef, value: impl Into<Value>) -> Self {
        Self::new(column, EvalType::EqIgnoreCase, value.into())
    }

    pub fn starts_with(column: ColumnRef, prefix: impl Into<Value>) -> Self {
        Self::new(column, EvalType::StartsWith, prefix.into())
    }

    pub fn is_null(column: ColumnRef) -> Self {
        Self::new(column, EvalType::IsNull, Value::Null)
    }

    pub fn is_not_null(column: ColumnRef) -> Self {
        Self::new(column, EvalType::IsNotNull, Value::Null)
    }
}

impl Predicate for ValuePredicate {
    fn eval(&self, row: &Row) -> bool {
        let row_value = match row.get(self.column.index) {
            Some(v) => v,
            None => return false,
        };

        match self.eval_type {
            EvalType::IsNull => return row_value.is_null(),
            EvalType::IsNotNull => return !row_value.is_null(),
            _ => {}
        }

        // Null never satisfies a comparison, on either side.
        if row_value.is_null() || self.value.is_null() {
            return false;
        }

        match self.eval_type {
            EvalType::Eq => row_value == &self.value,
            EvalType::Ne => row_value != &self.value,
            EvalType::Lt => row_value < &self.value,
            EvalType::Le => row_value <= &self.value,
            EvalType::Gt => row_value > &self.value,
            EvalType::Ge => row_value >= &self.value,
            EvalType::EqIgnoreCase => match (row_value.as_str(), self.value.as_str()) {
                (Some(a), Some(b)) => eq_ignore_case(a, b),
                _ => false,
            },
            EvalType::StartsWith => match (row_value.as_str(), self.value.as_str()) {
                (Some(a), Some(b)) => starts_with_ignore_case(a, b),
                _ => false,
            },
            EvalType::IsNull | EvalType::IsNotNull => false,
        }
    }

    fn columns(&self) -> Vec<&ColumnRef> {
        alloc::vec![&self.column]
    }
}

/// Logical operator for combining predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A combined predicate joins multiple predicates with AND/OR.
#[derive(Clone, Debug)]
pub struct CombinedPredicate {
    pub op: LogicalOp,
    pub children: Vec<Box<dyn PredicateClone>>,
}

impl CombinedPredicate {
    pub fn and(children: Vec<Box<dyn PredicateClone>>) -> Self {
        Self {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Box<dyn PredicateClone>>) -> Self {
        Self {
            op: LogicalOp::Or,
            children,
        }
    }
}

impl Predicate for CombinedPredicate {
    fn eval(&self, row: &Row) -> bool {
        match self.op {
            LogicalOp::And => self.children.iter().all(|p| p.eval(row)),
            LogicalOp::Or => self.children.iter().any(|p| p.eval(row)),
        }
    }

    fn columns(&self) -> Vec<&ColumnRef> {
        self.children.iter().flat_map(|p| p.columns()).collect()
    }
}

/// Negates an inner predicate. Null-rejecting like the comparisons: a row
/// with Null in any referenced column fails, so absence is still only
/// testable through `is_null` / `is_not_null`.
#[derive(Clone, Debug)]
pub struct NotPredicate {
    pub inner: Box<dyn PredicateClone>,
}

impl NotPredicate {
    pub fn new(inner: Box<dyn PredicateClone>) -> Self {
        Self { inner }
    }
}

impl Predicate for NotPredicate {
    fn eval(&self, row: &Row) -> bool {
        // Null stays unobservable under negation: a Null in any column the
        // inner predicate reads fails NOT just as it fails the comparison.
        let null_referenced = self
            .inner
            .columns()
            .iter()
            .any(|c| matches!(row.get(c.index), None | Some(Value::Null)));
        if null_referenced {
            return false;
        }
        !self.inner.eval(row)
    }

    fn columns(&self) -> Vec<&ColumnRef> {
        self.inner.columns()
    }
}
