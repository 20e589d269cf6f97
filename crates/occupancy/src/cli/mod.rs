//! Command-line interface for occupancy.
//!
//! This module provides the CLI structure for the `occq` binary and resolves
//! where the records for a run come from.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

pub use commands::{
    AverageAfterCommand, ByDurationCommand, ConfigCommand, DestinationsCommand,
    FirstAvailableCommand, FormatArg, GenerateCommand, HasDestinationCommand, PassengersCommand,
    TotalsCommand,
};

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::generator::Generator;
use crate::loader;
use crate::model::FlightOccupancy;

/// occq - Query flight occupancy records
///
/// Loads a set of occupancy records from a file (or generates a synthetic
/// set) and answers analytical questions about passengers, prices, and
/// departure dates.
#[derive(Debug, Parser)]
#[command(name = "occq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Records file to query (defaults to the configured records path)
    #[arg(short, long, global = true, value_name = "FILE", conflicts_with = "synthetic")]
    pub data: Option<PathBuf>,

    /// Query COUNT generated records instead of reading a file
    #[arg(long, global = true, value_name = "COUNT")]
    pub synthetic: Option<usize>,

    /// Seed for generated records
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Output format (defaults to output.format)
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<FormatArg>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Questions about the loaded records
    #[command(flatten)]
    Query(QueryCommand),

    /// Generate synthetic records and write them to a file
    Generate(GenerateCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that answer a question about a loaded record set.
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Total passengers to destinations starting with a prefix
    Passengers(PassengersCommand),

    /// Whether any of the destinations has a departure on a date
    HasDestination(HasDestinationCommand),

    /// Distinct destinations with a departure on a date
    Destinations(DestinationsCommand),

    /// Passengers per destination in a year, by destination descending
    Totals(TotalsCommand),

    /// Company of the earliest future flight with free seats
    FirstAvailable(FirstAvailableCommand),

    /// Mean price per destination over fully booked flights
    FullPrices,

    /// Destinations per date, ordered by flight duration
    ByDuration(ByDurationCommand),

    /// Mean price of flights departing after an instant
    AverageAfter(AverageAfterCommand),

    /// Departure dates per destination
    Dates,

    /// Distinct departure date-times per destination
    DepartureCounts,
}

/// Where the records for a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// A records file in the loader's text format.
    File {
        /// Path to the file.
        path: PathBuf,
        /// Field delimiter.
        delimiter: char,
    },
    /// Freshly generated records.
    Synthetic {
        /// Number of records.
        count: usize,
        /// Departure year.
        year: i32,
        /// Generator seed; random when unset.
        seed: Option<u64>,
    },
}

impl RecordSource {
    /// Produce the records described by this source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed, or the year is
    /// out of range.
    pub fn records(&self) -> Result<Vec<FlightOccupancy>> {
        debug!("Loading records from {:?}", self);
        match self {
            Self::File { path, delimiter } => loader::read_records(path, *delimiter),
            Self::Synthetic { count, year, seed } => {
                let mut generator = seed.map_or_else(Generator::from_entropy, Generator::from_seed);
                generator.generate(*count, *year)
            }
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// Get the output format, falling back to the configured one.
    #[must_use]
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.format.map_or(config.output.format, Into::into)
    }

    /// The file `config validate` should check, or `None` for other commands.
    ///
    /// Falls back to `--config`, then to the default configuration path.
    #[must_use]
    pub fn validation_target(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Config(ConfigCommand::Validate { file }) => Some(
                file.clone()
                    .or_else(|| self.config.clone())
                    .unwrap_or_else(Config::default_config_path),
            ),
            _ => None,
        }
    }

    /// Resolve the record source from flags and configuration.
    #[must_use]
    pub fn record_source(&self, config: &Config) -> RecordSource {
        if let Some(count) = self.synthetic {
            return RecordSource::Synthetic {
                count,
                year: config.generator.year,
                seed: self.seed.or(config.generator.seed),
            };
        }

        RecordSource::File {
            path: self.data.clone().unwrap_or_else(|| config.records_path()),
            delimiter: config.data.delimiter,
        }
    }
}
