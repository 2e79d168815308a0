//! Tabula Query - relational query pipeline for the tabula evaluator.
//!
//! This crate provides the eager, staged query pipeline: each stage consumes
//! a materialized [`executor::Relation`] and produces a new one. Stages are
//! composed through [`Query`], which also tracks the column types of the
//! current relation so join and grouping keys can be validated up front.
//!
//! Stages:
//!
//! - Filter: predicate evaluation ([`ast::predicate`])
//! - Join: inner and left outer equi-joins ([`executor::join`])
//! - Aggregate: grouping with plain and conditional aggregates
//! - Sort: stable multi-key ordering
//! - Top-N: best N rows per group
//! - Project: column selection and derived columns

#![no_std]

extern crate alloc;

pub mod ast;
pub mod executor;
pub mod pipeline;

pub use pipeline::{Query, QueryError};
