//! Schema definitions for entity collections.

mod column;
mod table;

pub use column::{Column, ForeignKey};
pub use table::{Table, TableBuilder};
