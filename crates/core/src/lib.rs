//! Tabula Core - value, row and schema primitives for the tabula evaluator.
//!
//! This crate provides the foundational types for the tabula in-memory
//! query evaluator:
//!
//! - `DataType`: Supported data types (Boolean, Int32, Int64, Float64, String, DateTime)
//! - `Value`: Runtime values that can be stored in a cell
//! - `Row`: A row of values with a unique identifier
//! - `schema`: Schema definitions (Column, Table, primary/foreign keys)
//! - `text`: Case-insensitive string comparison helpers
//! - `Error`: Schema construction errors (lookups that miss return `None`)
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{DataType, Value, Row};
//! use tabula_core::schema::TableBuilder;
//!
//! // Create a table schema
//! let table = TableBuilder::new("Customers")
//!     .unwrap()
//!     .add_column("CustomerId", DataType::Int32)
//!     .unwrap()
//!     .add_column("Name", DataType::String)
//!     .unwrap()
//!     .primary_key(&["CustomerId"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let row = Row::new(1, vec![
//!     Value::Int32(1),
//!     Value::String("Asha".into()),
//! ]);
//!
//! assert_eq!(table.get_column_index("Name"), Some(1));
//! assert_eq!(row.get(1), Some(&Value::String("Asha".into())));
//! ```

#![no_std]

extern crate alloc;

pub mod error;
pub mod row;
pub mod schema;
pub mod text;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use row::{next_row_id, Row, RowId, DUMMY_ROW_ID};
pub use types::DataType;
pub use value::Value;
