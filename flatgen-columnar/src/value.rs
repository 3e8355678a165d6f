use arrow_array::cast::AsArray;
use arrow_array::types::{Date32Type, Float32Type, Int32Type, Int64Type};
use arrow_array::{Array, ArrayRef};
use flatgen_error::{FlatgenError, FlatgenResult, flatgen_bail, flatgen_err};

use crate::schema::{ColumnSchema, ColumnSpec};

/// A single borrowed cell value, as emitted by [`ToRow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Utf8(&'a str),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Boolean(bool),
    Date32(i32),
    Binary(&'a [u8]),
}

impl Value<'_> {
    /// Short type description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Utf8(_) => "utf8".to_string(),
            Value::Int32(_) => "i32".to_string(),
            Value::Int64(_) => "i64".to_string(),
            Value::Float32(_) => "f32".to_string(),
            Value::Boolean(_) => "bool".to_string(),
            Value::Date32(_) => "date32".to_string(),
            Value::Binary(bytes) => format!("binary({})", bytes.len()),
        }
    }
}

/// Maps an in-memory record onto one value per schema column, in schema order.
pub trait ToRow {
    fn to_row(&self) -> Vec<Value<'_>>;
}

/// Rebuilds an in-memory record from a decoded row.
pub trait FromRow: Sized {
    fn from_row(row: &RowView<'_>) -> FlatgenResult<Self>;
}

/// A read-only view of one row of a decoded batch.
///
/// Columns are addressed by their position in the [`ColumnSchema`] the reader was opened with.
pub struct RowView<'a> {
    schema: &'a ColumnSchema,
    columns: &'a [ArrayRef],
    batch_offset: usize,
    index: usize,
}

impl<'a> RowView<'a> {
    /// `batch_offset` is the file row of the first row in `columns`; `index` is within the batch.
    pub(crate) fn new(
        schema: &'a ColumnSchema,
        columns: &'a [ArrayRef],
        batch_offset: usize,
        index: usize,
    ) -> Self {
        Self {
            schema,
            columns,
            batch_offset,
            index,
        }
    }

    /// Position of the row within the whole file.
    pub fn file_row(&self) -> usize {
        self.batch_offset + self.index
    }

    pub fn utf8(&self, column: usize) -> FlatgenResult<&'a str> {
        let array = self.column(column)?;
        array
            .as_string_opt::<i32>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    pub fn int32(&self, column: usize) -> FlatgenResult<i32> {
        let array = self.column(column)?;
        array
            .as_primitive_opt::<Int32Type>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    pub fn int64(&self, column: usize) -> FlatgenResult<i64> {
        let array = self.column(column)?;
        array
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    pub fn float32(&self, column: usize) -> FlatgenResult<f32> {
        let array = self.column(column)?;
        array
            .as_primitive_opt::<Float32Type>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    pub fn boolean(&self, column: usize) -> FlatgenResult<bool> {
        let array = self.column(column)?;
        array
            .as_boolean_opt()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    pub fn date32(&self, column: usize) -> FlatgenResult<i32> {
        let array = self.column(column)?;
        array
            .as_primitive_opt::<Date32Type>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    /// Bytes from either a variable-length or a fixed-width binary column.
    pub fn binary(&self, column: usize) -> FlatgenResult<&'a [u8]> {
        let array = self.column(column)?;
        if let Some(fixed) = array.as_fixed_size_binary_opt() {
            return Ok(fixed.value(self.index));
        }
        array
            .as_binary_opt::<i32>()
            .map(|a| a.value(self.index))
            .ok_or_else(|| self.type_error(column, array))
    }

    fn spec(&self, column: usize) -> FlatgenResult<&'a ColumnSpec> {
        self.schema.columns().get(column).ok_or_else(|| {
            flatgen_err!(
                "column index {column} out of bounds for a schema of {} columns",
                self.schema.len()
            )
        })
    }

    fn column(&self, column: usize) -> FlatgenResult<&'a dyn Array> {
        let spec = self.spec(column)?;
        let Some(array) = self.columns.get(column) else {
            flatgen_bail!(SchemaMismatch: "batch has no data for column {}", spec.name());
        };
        if array.is_null(self.index) {
            flatgen_bail!(
                SchemaMismatch: "column {} is null at row {}",
                spec.name(),
                self.file_row()
            );
        }
        Ok(array.as_ref())
    }

    fn type_error(&self, column: usize, array: &dyn Array) -> FlatgenError {
        let name = self.spec(column).map(ColumnSpec::name).unwrap_or("<unknown>");
        flatgen_err!(
            SchemaMismatch: "column {name} holds {} values",
            array.data_type()
        )
    }
}
