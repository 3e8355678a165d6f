use std::path::Path;

use bytes::Bytes;
use flatgen_error::{FlatgenError, FlatgenResult, flatgen_bail, flatgen_err};
use log::{debug, trace};
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::schema::ColumnSchema;
use crate::value::{FromRow, RowView};
use crate::writer::DEFAULT_BATCH_ROWS;

/// Default number of threads decoding row groups.
pub const DEFAULT_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Row groups decoded concurrently. Never affects the order of the rows returned.
    pub parallelism: usize,
    pub batch_rows: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl ReadOptions {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows;
        self
    }
}

/// Reads a whole Parquet file back into typed rows.
///
/// The file is loaded into memory once; its footer is parsed and checked against the
/// expected [`ColumnSchema`] before any row is decoded.
pub struct ColumnarReader {
    schema: ColumnSchema,
    data: Bytes,
    metadata: ArrowReaderMetadata,
    options: ReadOptions,
    row_count: usize,
}

impl ColumnarReader {
    pub fn open(
        path: impl AsRef<Path>,
        schema: ColumnSchema,
        options: ReadOptions,
    ) -> FlatgenResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            FlatgenError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        Self::try_new(Bytes::from(data), schema, options)
            .map_err(|e| e.with_context(format!("opening {}", path.display())))
    }

    pub fn try_new(data: Bytes, schema: ColumnSchema, options: ReadOptions) -> FlatgenResult<Self> {
        if options.parallelism == 0 {
            flatgen_bail!("parallelism must be at least 1");
        }
        if options.batch_rows == 0 {
            flatgen_bail!("batch_rows must be at least 1");
        }

        let metadata = ArrowReaderMetadata::load(&data, ArrowReaderOptions::default())?;
        schema.check_arrow(metadata.schema())?;

        let declared = metadata.metadata().file_metadata().num_rows();
        let row_count = usize::try_from(declared)
            .map_err(|_| flatgen_err!("footer declares {declared} rows"))?;
        debug!(
            "opened file with {row_count} rows in {} row groups",
            metadata.metadata().num_row_groups()
        );

        Ok(Self {
            schema,
            data,
            metadata,
            options,
            row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    /// Decodes every row of the file, in file order.
    pub fn read_all<R: FromRow + Send>(&self) -> FlatgenResult<Vec<R>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.parallelism)
            .build()?;

        let groups = pool.install(|| {
            (0..self.row_groups())
                .into_par_iter()
                .map(|row_group| self.read_row_group::<R>(row_group))
                .collect::<FlatgenResult<Vec<_>>>()
        })?;

        let mut rows = Vec::with_capacity(self.row_count);
        for group in groups {
            rows.extend(group);
        }

        if rows.len() != self.row_count {
            flatgen_bail!(
                "decoded {} rows but the footer declares {}",
                rows.len(),
                self.row_count
            );
        }
        Ok(rows)
    }

    fn read_row_group<R: FromRow>(&self, row_group: usize) -> FlatgenResult<Vec<R>> {
        let groups = self.metadata.metadata().row_groups();
        let expected = groups
            .get(row_group)
            .and_then(|rg| usize::try_from(rg.num_rows()).ok())
            .unwrap_or_default();
        let first_row: i64 = groups.iter().take(row_group).map(|rg| rg.num_rows()).sum();
        let mut batch_offset = usize::try_from(first_row)
            .map_err(|_| flatgen_err!("row group {row_group} starts at row {first_row}"))?;
        trace!("decoding row group {row_group} with {expected} rows from row {batch_offset}");

        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(
            self.data.clone(),
            self.metadata.clone(),
        )
        .with_row_groups(vec![row_group])
        .with_batch_size(self.options.batch_rows)
        .build()?;

        let mut rows = Vec::with_capacity(expected);
        for batch in reader {
            let batch = batch?;
            for index in 0..batch.num_rows() {
                let view = RowView::new(&self.schema, batch.columns(), batch_offset, index);
                rows.push(R::from_row(&view)?);
            }
            batch_offset += batch.num_rows();
        }
        Ok(rows)
    }
}
