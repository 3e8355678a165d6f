//! Row-at-a-time access to Parquet files.
//!
//! A [`ColumnSchema`] describes the columns of a file explicitly (name, logical type and
//! encoding hint) and is handed to both the [`ColumnarWriter`] and the [`ColumnarReader`].
//! Records cross the boundary through the [`ToRow`] and [`FromRow`] traits, so the schema
//! stays independent of any in-memory record type.

mod builder;
mod reader;
mod schema;
mod value;
mod writer;

pub use parquet::basic::Compression;
pub use reader::*;
pub use schema::*;
pub use value::*;
pub use writer::*;
