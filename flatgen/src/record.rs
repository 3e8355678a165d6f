use flatgen_columnar::{
    ColumnEncoding, ColumnSchema, ColumnSpec, FromRow, LogicalType, RowView, ToRow, Value,
};
use flatgen_error::{FlatgenResult, flatgen_err};
use uuid::Uuid;

/// One synthetic person.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub external_id: Uuid,
    pub id: i64,
    pub weight: f32,
    pub sex: bool,
    /// Days since the Unix epoch.
    pub day: i32,
}

/// The on-disk layout of a [`Record`]. Column order matches [`Record::to_row`].
pub fn record_schema() -> FlatgenResult<ColumnSchema> {
    ColumnSchema::try_new(vec![
        ColumnSpec::new("firstName", LogicalType::Utf8).with_encoding(ColumnEncoding::Dictionary),
        ColumnSpec::new("lastName", LogicalType::Utf8).with_encoding(ColumnEncoding::Dictionary),
        ColumnSpec::new("age", LogicalType::Int32),
        ColumnSpec::new("iid", LogicalType::FixedBinary(16)),
        ColumnSpec::new("id", LogicalType::Int64),
        ColumnSpec::new("weight", LogicalType::Float32),
        ColumnSpec::new("sex", LogicalType::Boolean),
        ColumnSpec::new("day", LogicalType::Date32),
    ])
}

impl Record {
    /// Name of the first field that differs between two records, if any.
    pub fn first_difference(&self, other: &Record) -> Option<&'static str> {
        [
            ("first_name", self.first_name == other.first_name),
            ("last_name", self.last_name == other.last_name),
            ("age", self.age == other.age),
            ("external_id", self.external_id == other.external_id),
            ("id", self.id == other.id),
            ("weight", self.weight.to_bits() == other.weight.to_bits()),
            ("sex", self.sex == other.sex),
            ("day", self.day == other.day),
        ]
        .into_iter()
        .find_map(|(field, same)| (!same).then_some(field))
    }
}

impl ToRow for Record {
    fn to_row(&self) -> Vec<Value<'_>> {
        vec![
            Value::Utf8(&self.first_name),
            Value::Utf8(&self.last_name),
            Value::Int32(self.age),
            Value::Binary(self.external_id.as_bytes()),
            Value::Int64(self.id),
            Value::Float32(self.weight),
            Value::Boolean(self.sex),
            Value::Date32(self.day),
        ]
    }
}

impl FromRow for Record {
    fn from_row(row: &RowView<'_>) -> FlatgenResult<Self> {
        let external_id = Uuid::from_slice(row.binary(3)?).map_err(|e| {
            flatgen_err!(SchemaMismatch: "iid at row {} is not a UUID: {e}", row.file_row())
        })?;

        Ok(Self {
            first_name: row.utf8(0)?.to_string(),
            last_name: row.utf8(1)?.to_string(),
            age: row.int32(2)?,
            external_id,
            id: row.int64(4)?,
            weight: row.float32(5)?,
            sex: row.boolean(6)?,
            day: row.date32(7)?,
        })
    }
}
