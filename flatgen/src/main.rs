use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flatgen::{
    Codec, DEFAULT_MIN_WORD_LENGTH, DEFAULT_OUTPUT, DEFAULT_RECORD_COUNT, DEFAULT_ROW_GROUP_MIB,
    DEFAULT_WORDS_PATH, RoundTripConfig, Verbosity, default_env_filter, run, setup_logger,
};
use flatgen_columnar::{DEFAULT_BATCH_ROWS, DEFAULT_PARALLELISM};
use tracing::error;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Newline-delimited word list used for names.
    #[arg(long, default_value = DEFAULT_WORDS_PATH)]
    words: PathBuf,
    /// Only words longer than this many bytes are used.
    #[arg(long, default_value_t = DEFAULT_MIN_WORD_LENGTH)]
    min_word_length: usize,
    /// Number of records to generate.
    #[arg(short = 'n', long, default_value_t = DEFAULT_RECORD_COUNT)]
    count: usize,
    /// Parquet file to write and read back.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Seed for the record generator. A random seed is drawn (and logged) when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t, value_enum)]
    compression: Codec,
    /// Close a row group once its encoded size reaches this many MiB.
    #[arg(long, default_value_t = DEFAULT_ROW_GROUP_MIB)]
    row_group_mib: usize,
    /// Rows buffered before they are encoded as one batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_ROWS)]
    batch_rows: usize,
    /// Row groups decoded concurrently when reading the file back.
    #[arg(short, long, default_value_t = DEFAULT_PARALLELISM)]
    parallelism: usize,
    /// Never give a record the same first and last name.
    #[arg(long)]
    distinct_names: bool,
    /// Skip the field-by-field comparison after reading.
    #[arg(long)]
    no_verify: bool,
    /// Hide progress bars.
    #[arg(short, long)]
    quiet: bool,
    /// Log at TRACE level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> RoundTripConfig {
        RoundTripConfig {
            words_path: self.words,
            min_word_length: self.min_word_length,
            count: self.count,
            output: self.output,
            seed: self.seed,
            codec: self.compression,
            row_group_bytes: RoundTripConfig::row_group_mib(self.row_group_mib),
            batch_rows: self.batch_rows,
            parallelism: self.parallelism,
            distinct_names: self.distinct_names,
            verify: !self.no_verify,
            show_progress: !self.quiet,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = default_env_filter(Verbosity::from_flag(args.verbose));
    if let Err(e) = setup_logger(filter) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(&args.into_config()) {
        Ok(report) => {
            report.log();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
