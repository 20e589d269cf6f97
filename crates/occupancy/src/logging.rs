//! Logging setup for occupancy.
//!
//! Query results go to stdout, so all diagnostics are written to stderr
//! through a `tracing` subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Load summaries and warnings.
    #[default]
    Normal,
    /// Per-query details.
    Verbose,
    /// Everything, including grouping internals.
    Trace,
}

impl Verbosity {
    /// The most verbose level this setting lets through.
    #[must_use]
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive scoping this level to the occupancy crate.
    #[must_use]
    pub fn directive(self) -> String {
        format!("occupancy={}", self.level_filter())
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity` when
/// set. Calling it again is a no-op.
///
/// # Examples
///
/// ```no_run
/// use occupancy::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    // Ignore the error if a subscriber is already installed
    let _ = subscriber.try_init();
}

/// Initialize logging for tests, capturing output per test.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("occupancy=debug")
        .with_test_writer()
        .try_init();
}
