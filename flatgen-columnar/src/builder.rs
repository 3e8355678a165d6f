use std::sync::Arc;

use arrow_array::ArrayRef;
use arrow_array::builder::{
    BinaryBuilder, BooleanBuilder, Date32Builder, FixedSizeBinaryBuilder, Float32Builder,
    Int32Builder, Int64Builder, StringBuilder,
};
use flatgen_error::{FlatgenResult, flatgen_bail};

use crate::schema::LogicalType;
use crate::value::Value;

/// Average payload we reserve per variable-length value.
const VARLEN_BYTES_HINT: usize = 16;

/// An Arrow builder for one column, chosen by the column's [`LogicalType`].
pub(crate) enum ColumnBuilder {
    Utf8(StringBuilder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    Float32(Float32Builder),
    Boolean(BooleanBuilder),
    Date32(Date32Builder),
    Binary(BinaryBuilder),
    FixedBinary(FixedSizeBinaryBuilder),
}

impl ColumnBuilder {
    pub fn with_capacity(logical_type: LogicalType, capacity: usize) -> Self {
        match logical_type {
            LogicalType::Utf8 => Self::Utf8(StringBuilder::with_capacity(
                capacity,
                capacity * VARLEN_BYTES_HINT,
            )),
            LogicalType::Int32 => Self::Int32(Int32Builder::with_capacity(capacity)),
            LogicalType::Int64 => Self::Int64(Int64Builder::with_capacity(capacity)),
            LogicalType::Float32 => Self::Float32(Float32Builder::with_capacity(capacity)),
            LogicalType::Boolean => Self::Boolean(BooleanBuilder::with_capacity(capacity)),
            LogicalType::Date32 => Self::Date32(Date32Builder::with_capacity(capacity)),
            LogicalType::Binary => Self::Binary(BinaryBuilder::with_capacity(
                capacity,
                capacity * VARLEN_BYTES_HINT,
            )),
            LogicalType::FixedBinary(width) => {
                Self::FixedBinary(FixedSizeBinaryBuilder::with_capacity(capacity, width))
            }
        }
    }

    pub fn append(&mut self, value: Value<'_>) -> FlatgenResult<()> {
        match (self, value) {
            (Self::Utf8(b), Value::Utf8(v)) => b.append_value(v),
            (Self::Int32(b), Value::Int32(v)) => b.append_value(v),
            (Self::Int64(b), Value::Int64(v)) => b.append_value(v),
            (Self::Float32(b), Value::Float32(v)) => b.append_value(v),
            (Self::Boolean(b), Value::Boolean(v)) => b.append_value(v),
            (Self::Date32(b), Value::Date32(v)) => b.append_value(v),
            (Self::Binary(b), Value::Binary(v)) => b.append_value(v),
            (Self::FixedBinary(b), Value::Binary(v)) => b.append_value(v)?,
            (_, value) => flatgen_bail!(
                SchemaMismatch: "cannot append a {} value to this column",
                value.describe()
            ),
        }
        Ok(())
    }

    /// Takes the buffered values as an array, leaving the builder empty and reusable.
    pub fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Utf8(b) => Arc::new(b.finish()),
            Self::Int32(b) => Arc::new(b.finish()),
            Self::Int64(b) => Arc::new(b.finish()),
            Self::Float32(b) => Arc::new(b.finish()),
            Self::Boolean(b) => Arc::new(b.finish()),
            Self::Date32(b) => Arc::new(b.finish()),
            Self::Binary(b) => Arc::new(b.finish()),
            Self::FixedBinary(b) => Arc::new(b.finish()),
        }
    }
}
