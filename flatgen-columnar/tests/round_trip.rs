use std::io::{self, Write};

use bytes::Bytes;
use flatgen_columnar::{
    ColumnEncoding, ColumnSchema, ColumnSpec, ColumnarReader, ColumnarWriter, Compression,
    FromRow, LogicalType, ReadOptions, RowView, ToRow, Value, WriteOptions,
};
use flatgen_error::{FlatgenError, FlatgenResult};
use rstest::rstest;
use tempfile::{NamedTempFile, TempDir};

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    sensor: String,
    sequence: i64,
    celsius: f32,
    healthy: bool,
    day: i32,
    tag: [u8; 4],
    payload: Vec<u8>,
    bucket: i32,
}

impl Reading {
    fn nth(n: usize) -> Self {
        let n32 = i32::try_from(n).unwrap();
        Self {
            sensor: format!("sensor-{}", n % 7),
            sequence: i64::try_from(n).unwrap() * 1_000_003,
            celsius: -20.0 + n as f32 * 0.25,
            healthy: n % 3 != 0,
            day: 19_000 + n32,
            tag: n32.to_le_bytes(),
            payload: vec![0xAB; n % 5],
            bucket: n32 % 11,
        }
    }
}

fn reading_schema() -> ColumnSchema {
    ColumnSchema::try_new(vec![
        ColumnSpec::new("sensor", LogicalType::Utf8).with_encoding(ColumnEncoding::Dictionary),
        ColumnSpec::new("sequence", LogicalType::Int64)
            .with_encoding(ColumnEncoding::DeltaBinaryPacked),
        ColumnSpec::new("celsius", LogicalType::Float32),
        ColumnSpec::new("healthy", LogicalType::Boolean),
        ColumnSpec::new("day", LogicalType::Date32),
        ColumnSpec::new("tag", LogicalType::FixedBinary(4)),
        ColumnSpec::new("payload", LogicalType::Binary),
        ColumnSpec::new("bucket", LogicalType::Int32),
    ])
    .unwrap()
}

impl ToRow for Reading {
    fn to_row(&self) -> Vec<Value<'_>> {
        vec![
            Value::Utf8(&self.sensor),
            Value::Int64(self.sequence),
            Value::Float32(self.celsius),
            Value::Boolean(self.healthy),
            Value::Date32(self.day),
            Value::Binary(&self.tag),
            Value::Binary(&self.payload),
            Value::Int32(self.bucket),
        ]
    }
}

impl FromRow for Reading {
    fn from_row(row: &RowView<'_>) -> FlatgenResult<Self> {
        Ok(Self {
            sensor: row.utf8(0)?.to_string(),
            sequence: row.int64(1)?,
            celsius: row.float32(2)?,
            healthy: row.boolean(3)?,
            day: row.date32(4)?,
            tag: row
                .binary(5)?
                .try_into()
                .map_err(|_| flatgen_error::flatgen_err!("tag is not 4 bytes"))?,
            payload: row.binary(6)?.to_vec(),
            bucket: row.int32(7)?,
        })
    }
}

/// Same column count as [`Reading`], but the second value has the wrong type.
struct Misfit;

impl ToRow for Misfit {
    fn to_row(&self) -> Vec<Value<'_>> {
        vec![
            Value::Utf8("misfit"),
            Value::Utf8("not a number"),
            Value::Float32(0.0),
            Value::Boolean(false),
            Value::Date32(0),
            Value::Binary(b"abcd"),
            Value::Binary(b""),
            Value::Int32(0),
        ]
    }
}

fn write_readings(path: &std::path::Path, count: usize, options: WriteOptions) -> usize {
    let mut writer = ColumnarWriter::create(path, reading_schema(), options).unwrap();
    for n in 0..count {
        writer.write(&Reading::nth(n)).unwrap();
    }
    let summary = writer.finish().unwrap();
    assert_eq!(summary.rows, count);
    summary.row_groups
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(8)]
fn parallel_read_keeps_file_order(#[case] parallelism: usize) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("readings.parquet");

    // A one-byte threshold closes a row group after every batch.
    let row_groups = write_readings(
        &path,
        250,
        WriteOptions::default()
            .with_batch_rows(25)
            .with_row_group_bytes(1),
    );
    assert_eq!(row_groups, 10);

    let reader = ColumnarReader::open(
        &path,
        reading_schema(),
        ReadOptions::default()
            .with_parallelism(parallelism)
            .with_batch_rows(7),
    )
    .unwrap();
    assert_eq!(reader.row_count(), 250);
    assert_eq!(reader.row_groups(), 10);

    let readings: Vec<Reading> = reader.read_all().unwrap();
    let expected: Vec<Reading> = (0..250).map(Reading::nth).collect();
    assert_eq!(readings, expected);
}

#[rstest]
#[case(Compression::UNCOMPRESSED)]
#[case(Compression::SNAPPY)]
#[case(Compression::GZIP(Default::default()))]
#[case(Compression::LZ4_RAW)]
#[case(Compression::ZSTD(Default::default()))]
fn every_codec_round_trips(#[case] compression: Compression) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codec.parquet");

    let row_groups = write_readings(
        &path,
        1000,
        WriteOptions::default().with_compression(compression),
    );
    assert_eq!(row_groups, 1);

    let readings: Vec<Reading> =
        ColumnarReader::open(&path, reading_schema(), ReadOptions::default())
            .unwrap()
            .read_all()
            .unwrap();
    assert_eq!(readings.len(), 1000);
    assert_eq!(readings[999], Reading::nth(999));
}

#[test]
fn rejected_rows_do_not_poison_the_writer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.parquet");

    let mut writer =
        ColumnarWriter::create(&path, reading_schema(), WriteOptions::default().with_batch_rows(4))
            .unwrap();
    let mut failures = 0;
    for n in 0..10 {
        if n % 4 == 1 {
            let err = writer.write(&Misfit).unwrap_err();
            assert!(matches!(err, FlatgenError::SchemaMismatch(_)));
            failures += 1;
        } else {
            writer.write(&Reading::nth(n)).unwrap();
        }
    }
    assert!(!writer.is_poisoned());
    let summary = writer.finish().unwrap();
    assert_eq!(failures, 3);
    assert_eq!(summary.rows, 7);

    let readings: Vec<Reading> =
        ColumnarReader::open(&path, reading_schema(), ReadOptions::default())
            .unwrap()
            .read_all()
            .unwrap();
    let sequences: Vec<i64> = readings.iter().map(|r| r.sequence).collect();
    let expected: Vec<i64> = [0, 2, 3, 4, 6, 7, 8]
        .into_iter()
        .map(|n| Reading::nth(n).sequence)
        .collect();
    assert_eq!(sequences, expected);
}

/// Accepts `capacity` bytes, then fails every write.
struct FullSink {
    capacity: usize,
}

impl Write for FullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.capacity == 0 {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "sink is full"));
        }
        let accepted = buf.len().min(self.capacity);
        self.capacity -= accepted;
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_poisons_the_writer() {
    let options = WriteOptions::default()
        .with_compression(Compression::UNCOMPRESSED)
        .with_batch_rows(4096)
        .with_row_group_bytes(1);
    let mut writer =
        ColumnarWriter::try_new(FullSink { capacity: 5 }, reading_schema(), options).unwrap();

    for n in 0..4095 {
        writer.write(&Reading::nth(n)).unwrap();
    }
    assert!(!writer.is_poisoned());

    // The batch-completing row pushes the buffered rows into the sink, which refuses them.
    let err = writer.write(&Reading::nth(4095)).unwrap_err();
    assert!(matches!(err.root(), FlatgenError::Parquet(_)));
    assert!(writer.is_poisoned());

    let err = writer.write(&Reading::nth(4096)).unwrap_err();
    assert!(matches!(err, FlatgenError::InvalidArgument(_)));
    assert!(writer.write(&Misfit).is_err());
    assert!(writer.is_poisoned());
    assert!(writer.finish().is_err());
}

/// A row's position in the file, as seen by [`FromRow`].
#[derive(Debug, PartialEq, Eq)]
struct FileRow(usize);

impl FromRow for FileRow {
    fn from_row(row: &RowView<'_>) -> FlatgenResult<Self> {
        Ok(Self(row.file_row()))
    }
}

#[rstest]
#[case(1)]
#[case(4)]
fn rows_know_their_file_position(#[case] parallelism: usize) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("positions.parquet");
    write_readings(
        &path,
        250,
        WriteOptions::default()
            .with_batch_rows(25)
            .with_row_group_bytes(1),
    );

    let positions: Vec<FileRow> = ColumnarReader::open(
        &path,
        reading_schema(),
        ReadOptions::default()
            .with_parallelism(parallelism)
            .with_batch_rows(7),
    )
    .unwrap()
    .read_all()
    .unwrap();
    let expected: Vec<FileRow> = (0..250).map(FileRow).collect();
    assert_eq!(positions, expected);
}

#[test]
fn empty_file_reads_back_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.parquet");
    assert_eq!(write_readings(&path, 0, WriteOptions::default()), 0);

    let reader = ColumnarReader::open(&path, reading_schema(), ReadOptions::default()).unwrap();
    assert_eq!(reader.row_count(), 0);
    assert!(reader.read_all::<Reading>().unwrap().is_empty());
}

#[test]
fn schema_mismatch_is_reported_on_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("readings.parquet");
    write_readings(&path, 10, WriteOptions::default());

    let other = ColumnSchema::try_new(vec![
        ColumnSpec::new("sensor", LogicalType::Utf8),
        ColumnSpec::new("sequence", LogicalType::Int32),
    ])
    .unwrap();
    let err = ColumnarReader::open(&path, other, ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err.root(), FlatgenError::SchemaMismatch(_)));
}

#[test]
fn missing_footer_is_a_decode_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "this is not a parquet file").unwrap();

    let err = ColumnarReader::open(file.path(), reading_schema(), ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err.root(), FlatgenError::Parquet(_)));

    let err = ColumnarReader::try_new(Bytes::new(), reading_schema(), ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, FlatgenError::Parquet(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ColumnarReader::open(
        dir.path().join("absent.parquet"),
        reading_schema(),
        ReadOptions::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err.root(), FlatgenError::Io(_)));
}

#[test]
fn zero_sized_options_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("readings.parquet");
    write_readings(&path, 1, WriteOptions::default());

    let err = ColumnarReader::open(
        &path,
        reading_schema(),
        ReadOptions::default().with_parallelism(0),
    )
    .err()
    .unwrap();
    assert!(matches!(err.root(), FlatgenError::InvalidArgument(_)));

    assert!(
        ColumnarWriter::try_new(
            Vec::new(),
            reading_schema(),
            WriteOptions::default().with_batch_rows(0)
        )
        .is_err()
    );
}
