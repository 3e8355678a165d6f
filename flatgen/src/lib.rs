//! Synthetic record generation with a Parquet round trip.
//!
//! Records are built from a word list and a seeded generator, written through
//! [`flatgen_columnar::ColumnarWriter`], then read back and compared field by field.

pub mod config;
pub mod generator;
pub mod logging;
pub mod picker;
pub mod record;
pub mod round_trip;
pub mod words;

pub use config::*;
pub use generator::*;
pub use logging::*;
pub use record::*;
pub use round_trip::*;
pub use words::*;
