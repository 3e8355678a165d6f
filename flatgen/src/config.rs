use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use clap::ValueEnum;
use flatgen_columnar::{
    Compression, DEFAULT_BATCH_ROWS, DEFAULT_PARALLELISM, ReadOptions, WriteOptions,
};

use crate::generator::DEFAULT_RECORD_COUNT;
use crate::words::{DEFAULT_MIN_WORD_LENGTH, DEFAULT_WORDS_PATH};

pub const DEFAULT_OUTPUT: &str = "flat.parquet";
pub const DEFAULT_ROW_GROUP_MIB: usize = 128;

const MIB: usize = 1024 * 1024;

/// Block compression applied to every column chunk.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, ValueEnum)]
pub enum Codec {
    #[clap(name = "uncompressed")]
    Uncompressed,
    #[default]
    #[clap(name = "snappy")]
    Snappy,
    #[clap(name = "gzip")]
    Gzip,
    #[clap(name = "lz4")]
    Lz4,
    #[clap(name = "zstd")]
    Zstd,
}

impl Codec {
    pub fn name(&self) -> &str {
        match self {
            Codec::Uncompressed => "uncompressed",
            Codec::Snappy => "snappy",
            Codec::Gzip => "gzip",
            Codec::Lz4 => "lz4",
            Codec::Zstd => "zstd",
        }
    }

    pub fn to_parquet(self) -> Compression {
        match self {
            Codec::Uncompressed => Compression::UNCOMPRESSED,
            Codec::Snappy => Compression::SNAPPY,
            Codec::Gzip => Compression::GZIP(Default::default()),
            Codec::Lz4 => Compression::LZ4_RAW,
            Codec::Zstd => Compression::ZSTD(Default::default()),
        }
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything a round trip needs. The defaults reproduce the reference run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripConfig {
    pub words_path: PathBuf,
    pub min_word_length: usize,
    pub count: usize,
    pub output: PathBuf,
    /// Seed for the record generator; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub codec: Codec,
    pub row_group_bytes: usize,
    pub batch_rows: usize,
    pub parallelism: usize,
    pub distinct_names: bool,
    pub verify: bool,
    pub show_progress: bool,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            words_path: PathBuf::from(DEFAULT_WORDS_PATH),
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            count: DEFAULT_RECORD_COUNT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            seed: None,
            codec: Codec::default(),
            row_group_bytes: DEFAULT_ROW_GROUP_MIB * MIB,
            batch_rows: DEFAULT_BATCH_ROWS,
            parallelism: DEFAULT_PARALLELISM,
            distinct_names: false,
            verify: true,
            show_progress: false,
        }
    }
}

impl RoundTripConfig {
    /// Converts a size in MiB into the byte threshold used for row groups.
    pub fn row_group_mib(mib: usize) -> usize {
        mib.saturating_mul(MIB)
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions::default()
            .with_compression(self.codec.to_parquet())
            .with_row_group_bytes(self.row_group_bytes)
            .with_batch_rows(self.batch_rows)
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_parallelism(self.parallelism)
            .with_batch_rows(self.batch_rows)
    }
}
