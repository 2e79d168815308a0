//! Tabula Dataset - entity store, fixture loader and canned reports.
//!
//! This crate holds the std-side of the evaluator: the seven entity
//! schemas (departments, employees, categories, products, customers,
//! orders, order items), an immutable [`store::EntityStore`] built from a
//! JSON fixture, a catalogue of reports expressed as staged pipelines
//! over the store, and a plain-text table renderer.

pub mod fixture;
pub mod render;
pub mod reports;
pub mod store;

pub use fixture::{load_str, FixtureError};
pub use store::{EntityKind, EntityStore};
