//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand, ValueEnum};

use crate::model::DEPARTURE_FORMAT;

/// `passengers` arguments.
#[derive(Debug, Args)]
pub struct PassengersCommand {
    /// Destination prefix (case-sensitive)
    pub prefix: String,
}

/// `has-destination` arguments.
#[derive(Debug, Args)]
pub struct HasDestinationCommand {
    /// Departure date (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,

    /// Destinations to look for
    #[arg(required = true, num_args = 1..)]
    pub destinations: Vec<String>,
}

/// `destinations` arguments.
#[derive(Debug, Args)]
pub struct DestinationsCommand {
    /// Departure date (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,
}

/// `totals` arguments.
#[derive(Debug, Args)]
pub struct TotalsCommand {
    /// Departure year
    pub year: i32,
}

/// `first-available` arguments.
#[derive(Debug, Args)]
pub struct FirstAvailableCommand {
    /// Destination city
    pub destination: String,

    /// Reference instant (defaults to the current local time)
    #[arg(long, value_parser = parse_date_time)]
    pub now: Option<NaiveDateTime>,
}

/// `by-duration` arguments.
#[derive(Debug, Args)]
pub struct ByDurationCommand {
    /// Requested destinations per date (currently not applied)
    #[arg(short, default_value = "3")]
    pub n: usize,
}

/// `average-after` arguments.
#[derive(Debug, Args)]
pub struct AverageAfterCommand {
    /// Only departures strictly after this instant count
    #[arg(value_parser = parse_date_time)]
    pub after: NaiveDateTime,
}

/// `generate` arguments.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// File to write (defaults to the configured records path)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of records (defaults to generator.count)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Departure year (defaults to generator.year)
    #[arg(short, long)]
    pub year: Option<i32>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Output format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}

impl From<FormatArg> for crate::config::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => Self::Plain,
            FormatArg::Json => Self::Json,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM[:SS]`, or a bare date
/// (midnight).
fn parse_date_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, DEPARTURE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| s.parse::<NaiveDateTime>())
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| format!("expected 'YYYY-MM-DD HH:MM', got '{s}'"))
}
