//! `occq` - CLI for occupancy
//!
//! This binary loads a set of flight occupancy records and runs one
//! analytical query against them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use occupancy::cli::{Cli, Command, ConfigCommand, GenerateCommand, QueryCommand, RecordSource};
use occupancy::config::OutputFormat;
use occupancy::{init_logging, loader, Config, QueryEngine, RecordStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation reports on the file itself, before anything else loads it
    if let Some(path) = cli.validation_target() {
        return handle_validate(&path);
    }

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let format = cli.output_format(&config);

    let source = cli.record_source(&config);

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Generate(generate_cmd) => handle_generate(&config, &generate_cmd, cli.seed),
        Command::Query(query) => {
            let records = source
                .records()
                .with_context(|| format!("loading records from {source:?}"))?;

            let store = RecordStore::new();
            store.load(records);
            run_query(&store.query(), query, format)
        }
    }
}

fn run_query(engine: &QueryEngine, query: QueryCommand, format: OutputFormat) -> anyhow::Result<()> {
    match query {
        QueryCommand::Passengers(cmd) => {
            let total = engine.total_passengers_to_prefix(&cmd.prefix);
            emit(format, &total, |t| t.to_string())
        }
        QueryCommand::HasDestination(cmd) => {
            let destinations: HashSet<String> = cmd.destinations.into_iter().collect();
            let found = engine.has_destination_on_date(&destinations, cmd.date);
            emit(format, &found, |f| (if *f { "yes" } else { "no" }).to_string())
        }
        QueryCommand::Destinations(cmd) => {
            let destinations = engine.distinct_destinations_on_date(cmd.date);
            emit(format, &destinations, |d| lines(d.iter()))
        }
        QueryCommand::Totals(cmd) => {
            let totals = engine.total_passengers_by_destination(cmd.year);
            emit(format, &totals, |t| {
                lines(t.iter().map(|(dest, total)| format!("{dest}: {total}")))
            })
        }
        QueryCommand::FirstAvailable(cmd) => {
            let now = cmd
                .now
                .unwrap_or_else(|| chrono::Local::now().naive_local());
            let company = engine.first_available_flight(&cmd.destination, now)?;
            emit(format, &company, String::clone)
        }
        QueryCommand::FullPrices => {
            let averages = engine.average_price_of_full_flights();
            emit(format, &averages, |a| {
                lines(a.iter().map(|(dest, avg)| format!("{dest}: {avg:.2}")))
            })
        }
        QueryCommand::ByDuration(cmd) => {
            let by_date = engine.destinations_by_duration_per_date(cmd.n);
            emit(format, &by_date, |b| {
                lines(
                    b.iter()
                        .map(|(date, dests)| format!("{date}: {}", dests.join(", "))),
                )
            })
        }
        QueryCommand::AverageAfter(cmd) => {
            let average = engine.average_price_after(cmd.after);
            emit(format, &average, |a| format!("{a:.2}"))
        }
        QueryCommand::Dates => {
            let dates = engine.dates_by_destination();
            emit(format, &dates, |d| {
                lines(d.iter().map(|(dest, dates)| {
                    let dates: Vec<String> = dates.iter().map(ToString::to_string).collect();
                    format!("{dest}: {}", dates.join(", "))
                }))
            })
        }
        QueryCommand::DepartureCounts => {
            let counts = engine.distinct_departure_count_by_destination();
            emit(format, &counts, |c| {
                lines(c.iter().map(|(dest, count)| format!("{dest}: {count}")))
            })
        }
    }
}

/// Print `value` as JSON, or through `plain` for text output.
fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    plain: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Plain => {
            let text = plain(value);
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }
    Ok(())
}

fn lines<I>(items: I) -> String
where
    I: Iterator,
    I::Item: std::fmt::Display,
{
    items
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn handle_generate(
    config: &Config,
    cmd: &GenerateCommand,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let count = cmd.count.unwrap_or(config.generator.count);
    let year = cmd.year.unwrap_or(config.generator.year);
    let path = cmd.output.clone().unwrap_or_else(|| config.records_path());

    let records = RecordSource::Synthetic {
        count,
        year,
        seed: seed.or(config.generator.seed),
    }
    .records()?;

    loader::write_records(&path, &records, config.data.delimiter)
        .with_context(|| format!("writing generated records to {}", path.display()))?;
    println!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Data]");
                println!("  Records path:       {}", config.records_path().display());
                println!("  Delimiter:          {:?}", config.data.delimiter);
                println!();
                println!("[Generator]");
                println!("  Count:              {}", config.generator.count);
                println!("  Year:               {}", config.generator.year);
                match config.generator.seed {
                    Some(seed) => println!("  Seed:               {seed}"),
                    None => println!("  Seed:               random"),
                }
                println!();
                println!("[Output]");
                println!("  Format:             {:?}", config.output.format);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            return handle_validate(&file.unwrap_or_else(Config::default_config_path));
        }
    }
    Ok(())
}

fn handle_validate(path: &Path) -> anyhow::Result<()> {
    println!("Validating configuration: {}", path.display());
    Config::load_from(Some(path.to_path_buf()))
        .with_context(|| format!("configuration {} is invalid", path.display()))?;
    println!("Configuration is valid.");
    Ok(())
}
