use std::fs::File;
use std::io::Write;
use std::path::Path;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use flatgen_error::{FlatgenError, FlatgenResult, flatgen_bail, flatgen_err};
use log::{debug, trace};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;

use crate::builder::ColumnBuilder;
use crate::schema::ColumnSchema;
use crate::value::{ToRow, Value};

/// Default cap on the encoded size of an in-progress row group.
pub const DEFAULT_ROW_GROUP_BYTES: usize = 128 * 1024 * 1024;
/// Default number of rows buffered before they are encoded as one batch.
pub const DEFAULT_BATCH_ROWS: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub compression: Compression,
    pub row_group_bytes: usize,
    pub batch_rows: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_bytes: DEFAULT_ROW_GROUP_BYTES,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl WriteOptions {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_row_group_bytes(mut self, row_group_bytes: usize) -> Self {
        self.row_group_bytes = row_group_bytes;
        self
    }

    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows;
        self
    }
}

/// What ended up in a finished file, as recorded in its footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows: usize,
    pub row_groups: usize,
}

/// Writes rows one at a time into a Parquet file described by a [`ColumnSchema`].
///
/// Rows are buffered column-wise and encoded every `batch_rows` rows. A row group is closed
/// once its in-progress encoded size reaches `row_group_bytes`.
///
/// A row rejected by the schema leaves the writer as it was. Any later failure (encoding a
/// batch, or the sink refusing bytes) loses the buffered rows, so it poisons the writer and
/// every following call fails.
pub struct ColumnarWriter<W: Write + Send> {
    schema: ColumnSchema,
    arrow_schema: SchemaRef,
    options: WriteOptions,
    builders: Vec<ColumnBuilder>,
    buffered_rows: usize,
    poisoned: bool,
    writer: ArrowWriter<W>,
}

impl ColumnarWriter<File> {
    /// Creates (or truncates) the file at `path` and writes into it.
    pub fn create(
        path: impl AsRef<Path>,
        schema: ColumnSchema,
        options: WriteOptions,
    ) -> FlatgenResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            FlatgenError::from(e).with_context(format!("creating {}", path.display()))
        })?;
        Self::try_new(file, schema, options)
    }
}

impl<W: Write + Send> ColumnarWriter<W> {
    pub fn try_new(sink: W, schema: ColumnSchema, options: WriteOptions) -> FlatgenResult<Self> {
        if options.batch_rows == 0 {
            flatgen_bail!("batch_rows must be at least 1");
        }
        if options.row_group_bytes == 0 {
            flatgen_bail!("row_group_bytes must be at least 1");
        }

        let arrow_schema = schema.to_arrow();
        let properties = schema.writer_properties(options.compression);
        let writer = ArrowWriter::try_new(sink, arrow_schema.clone(), Some(properties))?;
        let builders = schema
            .columns()
            .iter()
            .map(|c| ColumnBuilder::with_capacity(c.logical_type(), options.batch_rows))
            .collect();

        Ok(Self {
            schema,
            arrow_schema,
            options,
            builders,
            buffered_rows: 0,
            poisoned: false,
            writer,
        })
    }

    /// Appends one row.
    ///
    /// The row is checked against the schema before anything is buffered, so a rejected row
    /// leaves the writer unchanged and later rows can still be written. Check
    /// [`is_poisoned`](Self::is_poisoned) to tell such a rejection from a fatal failure.
    pub fn write<R: ToRow + ?Sized>(&mut self, row: &R) -> FlatgenResult<()> {
        self.check_usable()?;
        let values = row.to_row();
        self.schema.check_row(&values)?;

        self.append(values).map_err(|e| {
            self.poisoned = true;
            e.with_context("encoding buffered rows")
        })
    }

    /// Whether an earlier failure lost buffered rows and left the writer unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Flushes buffered rows, writes the footer and closes the sink.
    pub fn finish(mut self) -> FlatgenResult<WriteSummary> {
        self.check_usable()?;
        self.flush_batch()?;
        let metadata = self.writer.close()?;
        let rows = usize::try_from(metadata.num_rows)
            .map_err(|_| flatgen_err!("footer reports {} rows", metadata.num_rows))?;

        debug!(
            "closed file with {rows} rows in {} row groups",
            metadata.row_groups.len()
        );
        Ok(WriteSummary {
            rows,
            row_groups: metadata.row_groups.len(),
        })
    }

    fn check_usable(&self) -> FlatgenResult<()> {
        if self.poisoned {
            flatgen_bail!("writer is unusable after an earlier write failure");
        }
        Ok(())
    }

    fn append(&mut self, values: Vec<Value<'_>>) -> FlatgenResult<()> {
        for (builder, value) in self.builders.iter_mut().zip(values) {
            builder.append(value)?;
        }
        self.buffered_rows += 1;

        if self.buffered_rows >= self.options.batch_rows {
            self.flush_batch()?;
        }
        Ok(())
    }

    fn flush_batch(&mut self) -> FlatgenResult<()> {
        if self.buffered_rows == 0 {
            return Ok(());
        }

        let columns = self.builders.iter_mut().map(ColumnBuilder::finish).collect();
        let batch = RecordBatch::try_new(self.arrow_schema.clone(), columns)?;
        trace!("encoding batch of {} rows", self.buffered_rows);
        self.buffered_rows = 0;
        self.writer.write(&batch)?;

        let in_progress = self.writer.in_progress_size();
        if in_progress >= self.options.row_group_bytes {
            debug!(
                "closing row group of {} rows at {in_progress} bytes",
                self.writer.in_progress_rows()
            );
            self.writer.flush()?;
        }
        Ok(())
    }
}
