//! Line-oriented text format for occupancy records.
//!
//! Each non-blank line holds one record:
//!
//! ```text
//! company_code,destination_city,seat_capacity,price,duration_minutes,YYYY-MM-DD HH:MM,passengers
//! ```
//!
//! Lines starting with `#` are comments. Fields are trimmed, and the
//! delimiter is configurable. Text fields can't contain the delimiter or a
//! line break, and can't start or end with whitespace; [`format_records`]
//! refuses records that break this, so anything written can be read back.

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Flight, FlightOccupancy, DEPARTURE_FORMAT};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Number of fields in a record line.
const FIELD_COUNT: usize = 7;

/// Parse a single record line. `line_no` is only used in error messages.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the line doesn't hold a well-formed record.
pub fn parse_line(line: &str, delimiter: char, line_no: usize) -> Result<FlightOccupancy> {
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::parse(
            line_no,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }

    let company_code = fields[0];
    let destination = fields[1];
    if destination.is_empty() {
        return Err(Error::parse(line_no, "destination city is empty"));
    }

    let seat_capacity: u32 = parse_field(fields[2], "seat capacity", line_no)?;
    let price: f64 = parse_field(fields[3], "price", line_no)?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::parse(
            line_no,
            format!("price must be a non-negative number, got {price}"),
        ));
    }
    let duration: u32 = parse_field(fields[4], "duration", line_no)?;

    let departure = NaiveDateTime::parse_from_str(fields[5], DEPARTURE_FORMAT).map_err(|e| {
        Error::parse(line_no, format!("invalid departure '{}': {e}", fields[5]))
    })?;
    let passengers: u32 = parse_field(fields[6], "passenger count", line_no)?;

    Ok(FlightOccupancy::new(
        Flight::new(company_code, destination, seat_capacity, price, duration),
        departure,
        passengers,
    ))
}

fn parse_field<T>(value: &str, name: &str, line_no: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::parse(line_no, format!("invalid {name} '{value}': {e}")))
}

/// Parse every record in `input`, stopping at the first malformed line.
///
/// # Errors
///
/// Returns [`Error::Parse`] for the first line that can't be parsed.
pub fn parse_records(input: &str, delimiter: char) -> Result<Vec<FlightOccupancy>> {
    let mut records = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Fields are trimmed one by one; trimming the whole line would eat a
        // leading empty field when the delimiter is whitespace.
        records.push(parse_line(line, delimiter, idx + 1)?);
    }
    debug!("Parsed {} records", records.len());
    Ok(records)
}

/// Read and parse a records file.
///
/// # Errors
///
/// Returns an error if the file can't be read or contains a malformed line.
pub fn read_records(path: impl AsRef<Path>, delimiter: char) -> Result<Vec<FlightOccupancy>> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| Error::ReadRecords {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&input, delimiter)?;
    info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Check that a record's text fields survive a write and a re-read.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming the line the record would occupy.
pub fn check_writable(record: &FlightOccupancy, delimiter: char, line_no: usize) -> Result<()> {
    let flight = &record.flight;
    if flight.destination_city.is_empty() {
        return Err(Error::parse(line_no, "destination city is empty"));
    }
    if flight.company_code.starts_with('#') {
        return Err(Error::parse(
            line_no,
            format!("company code '{}' would be read as a comment", flight.company_code),
        ));
    }

    for (name, value) in [
        ("company code", flight.company_code.as_str()),
        ("destination city", flight.destination_city.as_str()),
    ] {
        if value.contains(delimiter) {
            return Err(Error::parse(
                line_no,
                format!("{name} '{value}' contains the delimiter {delimiter:?}"),
            ));
        }
        if value.contains(['\n', '\r']) {
            return Err(Error::parse(line_no, format!("{name} contains a line break")));
        }
        if value.trim() != value {
            return Err(Error::parse(
                line_no,
                format!("{name} '{value}' has leading or trailing whitespace"),
            ));
        }
    }
    Ok(())
}

/// Render records as text, one line per record.
///
/// # Errors
///
/// Returns [`Error::Parse`] for the first record that couldn't be read back.
pub fn format_records(records: &[FlightOccupancy], delimiter: char) -> Result<String> {
    let mut out = String::new();
    for (idx, r) in records.iter().enumerate() {
        check_writable(r, delimiter, idx + 1)?;
        out.push_str(&r.to_line(delimiter));
        out.push('\n');
    }
    Ok(out)
}

/// Write records to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a record can't be represented in the text
/// format, or an I/O error if the directory or file can't be written.
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[FlightOccupancy],
    delimiter: char,
) -> Result<()> {
    let path = path.as_ref();
    let text = format_records(records, delimiter)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, text).map_err(|source| {
        Error::WriteRecords {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
