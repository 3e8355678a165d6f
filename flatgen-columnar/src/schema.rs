use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};
use flatgen_error::{FlatgenResult, flatgen_bail};
use parquet::basic::{Compression, Encoding};
use parquet::file::properties::WriterProperties;
use parquet::schema::types::ColumnPath;

use crate::value::Value;

/// The logical type of a column, independent of how the values are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Utf8,
    Int32,
    Int64,
    Float32,
    Boolean,
    /// Days since the Unix epoch.
    Date32,
    /// Variable-length bytes.
    Binary,
    /// Bytes of exactly the given width.
    FixedBinary(i32),
}

impl LogicalType {
    pub fn to_arrow(self) -> DataType {
        match self {
            LogicalType::Utf8 => DataType::Utf8,
            LogicalType::Int32 => DataType::Int32,
            LogicalType::Int64 => DataType::Int64,
            LogicalType::Float32 => DataType::Float32,
            LogicalType::Boolean => DataType::Boolean,
            LogicalType::Date32 => DataType::Date32,
            LogicalType::Binary => DataType::Binary,
            LogicalType::FixedBinary(width) => DataType::FixedSizeBinary(width),
        }
    }

    /// Whether a value can be stored in a column of this type without conversion.
    pub fn accepts(self, value: &Value<'_>) -> bool {
        match (self, value) {
            (LogicalType::Utf8, Value::Utf8(_))
            | (LogicalType::Int32, Value::Int32(_))
            | (LogicalType::Int64, Value::Int64(_))
            | (LogicalType::Float32, Value::Float32(_))
            | (LogicalType::Boolean, Value::Boolean(_))
            | (LogicalType::Date32, Value::Date32(_))
            | (LogicalType::Binary, Value::Binary(_)) => true,
            (LogicalType::FixedBinary(width), Value::Binary(bytes)) => {
                usize::try_from(width).is_ok_and(|width| width == bytes.len())
            }
            _ => false,
        }
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalType::Utf8 => write!(f, "utf8"),
            LogicalType::Int32 => write!(f, "i32"),
            LogicalType::Int64 => write!(f, "i64"),
            LogicalType::Float32 => write!(f, "f32"),
            LogicalType::Boolean => write!(f, "bool"),
            LogicalType::Date32 => write!(f, "date32"),
            LogicalType::Binary => write!(f, "binary"),
            LogicalType::FixedBinary(width) => write!(f, "binary({width})"),
        }
    }
}

/// Encoding hint handed to the Parquet writer for a single column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColumnEncoding {
    #[default]
    Plain,
    Dictionary,
    DeltaBinaryPacked,
}

impl ColumnEncoding {
    pub fn supports(self, logical_type: LogicalType) -> bool {
        match self {
            ColumnEncoding::Plain => true,
            // Parquet never dictionary encodes booleans.
            ColumnEncoding::Dictionary => logical_type != LogicalType::Boolean,
            ColumnEncoding::DeltaBinaryPacked => matches!(
                logical_type,
                LogicalType::Int32 | LogicalType::Int64 | LogicalType::Date32
            ),
        }
    }
}

impl Display for ColumnEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnEncoding::Plain => write!(f, "plain"),
            ColumnEncoding::Dictionary => write!(f, "dictionary"),
            ColumnEncoding::DeltaBinaryPacked => write!(f, "delta-binary-packed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    name: String,
    logical_type: LogicalType,
    encoding: ColumnEncoding,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            encoding: ColumnEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: ColumnEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    pub fn encoding(&self) -> ColumnEncoding {
        self.encoding
    }
}

/// An ordered description of the columns of a file.
///
/// Rows are matched to columns by position, so the order of the specs is the order in which
/// [`ToRow`](crate::ToRow) implementations must emit their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    pub fn try_new(columns: Vec<ColumnSpec>) -> FlatgenResult<Self> {
        if columns.is_empty() {
            flatgen_bail!("a column schema needs at least one column");
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                flatgen_bail!("duplicate column name {}", column.name());
            }
            if !column.encoding().supports(column.logical_type()) {
                flatgen_bail!(
                    "column {} cannot use {} encoding for {} values",
                    column.name(),
                    column.encoding(),
                    column.logical_type()
                );
            }
            if let LogicalType::FixedBinary(width) = column.logical_type() {
                if width <= 0 {
                    flatgen_bail!(
                        "column {} has non-positive binary width {width}",
                        column.name()
                    );
                }
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn to_arrow(&self) -> SchemaRef {
        Arc::new(Schema::new(
            self.columns
                .iter()
                .map(|c| Field::new(c.name(), c.logical_type().to_arrow(), false))
                .collect::<Vec<_>>(),
        ))
    }

    /// Builds Parquet writer properties carrying the per-column encoding hints.
    pub fn writer_properties(&self, compression: Compression) -> WriterProperties {
        self.columns
            .iter()
            .fold(
                WriterProperties::builder().set_compression(compression),
                |builder, column| {
                    let path = ColumnPath::from(column.name());
                    match column.encoding() {
                        ColumnEncoding::Dictionary => {
                            builder.set_column_dictionary_enabled(path, true)
                        }
                        ColumnEncoding::Plain => builder
                            .set_column_dictionary_enabled(path.clone(), false)
                            .set_column_encoding(path, Encoding::PLAIN),
                        ColumnEncoding::DeltaBinaryPacked => builder
                            .set_column_dictionary_enabled(path.clone(), false)
                            .set_column_encoding(path, Encoding::DELTA_BINARY_PACKED),
                    }
                },
            )
            .build()
    }

    /// Checks that a row carries one value of the right type for every column.
    pub fn check_row(&self, values: &[Value<'_>]) -> FlatgenResult<()> {
        if values.len() != self.columns.len() {
            flatgen_bail!(
                SchemaMismatch: "row has {} values but the schema has {} columns",
                values.len(),
                self.columns.len()
            );
        }

        for (column, value) in self.columns.iter().zip(values) {
            if !column.logical_type().accepts(value) {
                flatgen_bail!(
                    SchemaMismatch: "column {} expects {} but got {}",
                    column.name(),
                    column.logical_type(),
                    value.describe()
                );
            }
        }

        Ok(())
    }

    /// Checks that a file's schema has exactly these columns, in this order, with these types.
    pub fn check_arrow(&self, schema: &Schema) -> FlatgenResult<()> {
        let fields = schema.fields();
        if fields.len() != self.columns.len() {
            flatgen_bail!(
                SchemaMismatch: "file has {} columns but {} were expected",
                fields.len(),
                self.columns.len()
            );
        }

        for (column, field) in self.columns.iter().zip(fields.iter()) {
            if field.name() != column.name() {
                flatgen_bail!(
                    SchemaMismatch: "expected column {} but the file has {}",
                    column.name(),
                    field.name()
                );
            }
            let expected = column.logical_type().to_arrow();
            if field.data_type() != &expected {
                flatgen_bail!(
                    SchemaMismatch: "column {} is stored as {} but {} was expected",
                    column.name(),
                    field.data_type(),
                    expected
                );
            }
        }

        Ok(())
    }
}
