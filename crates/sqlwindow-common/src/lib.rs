//! Common types and error handling for the sqlwindow evaluation engine.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod result;
pub mod types;

pub use error::{Error, Result};
pub use result::{ColumnInfo, QueryResult, Row};
pub use types::{DataType, Field, FieldMode, Schema, Value};
