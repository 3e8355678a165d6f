use std::path::Path;
use std::time::{Duration, Instant};

use flatgen_columnar::{ColumnSchema, ColumnarReader, ColumnarWriter, WriteOptions, WriteSummary};
use flatgen_error::{FlatgenError, FlatgenResult, flatgen_bail};
use humansize::{BINARY, format_size};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::config::RoundTripConfig;
use crate::generator::{RecordGenerator, random_seed};
use crate::record::{Record, record_schema};
use crate::words::WordList;

/// The outcome of one generate, write, read and verify cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub seed: u64,
    pub requested: usize,
    pub written: usize,
    pub write_failures: usize,
    pub row_groups: usize,
    pub read: usize,
    pub file_bytes: u64,
    pub verified: bool,
    pub write_elapsed: Duration,
    pub read_elapsed: Duration,
}

impl RoundTripReport {
    pub fn log(&self) {
        info!(
            seed = self.seed,
            rows = self.written,
            failed = self.write_failures,
            row_groups = self.row_groups,
            size = %format_size(self.file_bytes, BINARY),
            elapsed = ?self.write_elapsed,
            "write finished"
        );
        info!(
            rows = self.read,
            verified = self.verified,
            elapsed = ?self.read_elapsed,
            "read finished"
        );
    }
}

/// Rows that made it into a file, by index into the records handed to [`write_records`].
pub struct WrittenRecords {
    pub summary: WriteSummary,
    pub accepted: Vec<usize>,
}

impl WrittenRecords {
    pub fn failures(&self, requested: usize) -> usize {
        requested.saturating_sub(self.accepted.len())
    }
}

/// Loads the configured word list and runs a full round trip.
pub fn run(config: &RoundTripConfig) -> FlatgenResult<RoundTripReport> {
    let words = WordList::load(&config.words_path, config.min_word_length)?;
    info!(
        words = words.len(),
        path = %config.words_path.display(),
        "loaded word list"
    );
    run_with_words(config, &words)
}

/// Runs a round trip with an already loaded word list.
pub fn run_with_words(
    config: &RoundTripConfig,
    words: &WordList,
) -> FlatgenResult<RoundTripReport> {
    let seed = config.seed.unwrap_or_else(random_seed);
    let mut generator =
        RecordGenerator::try_new(words, seed)?.with_distinct_names(config.distinct_names);
    info!(seed, count = config.count, day = generator.day(), "generating records");

    let schema = record_schema()?;
    let records = generator.generate(config.count)?;

    let progress = if config.show_progress {
        ProgressBar::new(records.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let write_start = Instant::now();
    let written = write_records(
        &config.output,
        schema.clone(),
        &records,
        config.write_options(),
        &progress,
    )?;
    let write_elapsed = write_start.elapsed();
    let file_bytes = std::fs::metadata(&config.output)?.len();

    let read_start = Instant::now();
    let read_back = read_records(&config.output, schema, config)?;
    let read_elapsed = read_start.elapsed();

    if read_back.len() != written.summary.rows {
        flatgen_bail!(
            Verification: "wrote {} rows but read back {}",
            written.summary.rows,
            read_back.len()
        );
    }

    if config.verify {
        let expected: Vec<&Record> = written
            .accepted
            .iter()
            .filter_map(|&index| records.get(index))
            .collect();
        verify(&expected, &read_back)?;
        debug!(rows = read_back.len(), "every field matches");
    }

    Ok(RoundTripReport {
        seed,
        requested: config.count,
        written: written.summary.rows,
        write_failures: written.failures(records.len()),
        row_groups: written.summary.row_groups,
        read: read_back.len(),
        file_bytes,
        verified: config.verify,
        write_elapsed,
        read_elapsed,
    })
}

/// Writes every record, logging and skipping the ones the schema rejects.
///
/// A failure that poisons the writer is fatal, as are creating the file, constructing the
/// writer and finalizing it.
pub fn write_records(
    path: &Path,
    schema: ColumnSchema,
    records: &[Record],
    options: WriteOptions,
    progress: &ProgressBar,
) -> FlatgenResult<WrittenRecords> {
    let mut writer = ColumnarWriter::create(path, schema, options)?;
    let mut accepted = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match writer.write(record) {
            Ok(()) => accepted.push(index),
            Err(e) if writer.is_poisoned() => {
                progress.abandon();
                let context = format!("writing record {index} to {}", path.display());
                return Err(e.with_context(context));
            }
            Err(e) => warn!(index, "skipping record: {e}"),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = writer
        .finish()
        .map_err(|e| e.with_context(format!("finalizing {}", path.display())))?;
    Ok(WrittenRecords { summary, accepted })
}

/// Reads every record of a file written with the record schema.
pub fn read_records(
    path: &Path,
    schema: ColumnSchema,
    config: &RoundTripConfig,
) -> FlatgenResult<Vec<Record>> {
    let reader = ColumnarReader::open(path, schema, config.read_options())?;
    debug!(
        rows = reader.row_count(),
        row_groups = reader.row_groups(),
        parallelism = config.parallelism,
        "reading file"
    );
    reader
        .read_all()
        .map_err(|e: FlatgenError| e.with_context(format!("decoding {}", path.display())))
}

/// Compares the records that were written with the ones read back, in order.
pub fn verify(written: &[&Record], read: &[Record]) -> FlatgenResult<()> {
    if written.len() != read.len() {
        flatgen_bail!(
            Verification: "{} records written but {} read",
            written.len(),
            read.len()
        );
    }

    for (row, (expected, actual)) in written.iter().zip(read).enumerate() {
        if let Some(field) = expected.first_difference(actual) {
            flatgen_bail!(Verification: "row {row} differs in {field}");
        }
    }
    Ok(())
}
