use std::io::IsTerminal;

use flatgen_error::{FlatgenResult, flatgen_err};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How much the binary reports when `RUST_LOG` is not set.
///
/// `--quiet` only hides progress bars, so the final report is still logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flag(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn level(self) -> LevelFilter {
        match self {
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::TRACE,
        }
    }
}

/// `RUST_LOG` when it parses, otherwise the level implied by `verbosity`.
pub fn default_env_filter(verbosity: Verbosity) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_e) => EnvFilter::builder()
            .with_default_directive(verbosity.level().into())
            .from_env_lossy(),
    }
}

/// Installs the global subscriber. Records emitted through `log` are forwarded to it.
pub fn setup_logger(filter: EnvFilter) -> FlatgenResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_level(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| flatgen_err!("failed to install logger: {e}"))
}
