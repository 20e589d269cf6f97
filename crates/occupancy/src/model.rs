//! Core record types for occupancy.
//!
//! A [`Flight`] describes a scheduled offering; a [`FlightOccupancy`] is one
//! observed departure of that flight with its passenger count. Every
//! occupancy embeds its own copy of the flight data.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used for departure date-times in text records.
pub const DEPARTURE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A scheduled flight offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Code of the operating airline.
    pub company_code: String,

    /// Destination city. Never empty when produced by the loader.
    pub destination_city: String,

    /// Total sellable seats.
    pub seat_capacity: u32,

    /// Ticket price.
    pub price: f64,

    /// Flight length in minutes.
    pub duration: u32,
}

impl Flight {
    /// Create a new flight.
    #[must_use]
    pub fn new(
        company_code: impl Into<String>,
        destination_city: impl Into<String>,
        seat_capacity: u32,
        price: f64,
        duration: u32,
    ) -> Self {
        Self {
            company_code: company_code.into(),
            destination_city: destination_city.into(),
            seat_capacity,
            price,
            duration,
        }
    }
}

/// One observed occupancy of a flight at a specific departure date-time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOccupancy {
    /// The flight this occupancy belongs to.
    pub flight: Flight,

    /// Departure date and time.
    pub departure: NaiveDateTime,

    /// Passengers on board. May exceed the seat capacity (overbooking).
    pub passengers: u32,
}

impl FlightOccupancy {
    /// Create a new occupancy record.
    #[must_use]
    pub fn new(flight: Flight, departure: NaiveDateTime, passengers: u32) -> Self {
        Self {
            flight,
            departure,
            passengers,
        }
    }

    /// Destination city of the underlying flight.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.flight.destination_city
    }

    /// Calendar date of the departure.
    #[must_use]
    pub fn departure_date(&self) -> NaiveDate {
        self.departure.date()
    }

    /// Whether at least one seat is still free.
    #[must_use]
    pub fn has_free_seats(&self) -> bool {
        self.passengers < self.flight.seat_capacity
    }

    /// Whether the flight is exactly fully booked.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.passengers == self.flight.seat_capacity
    }

    /// Render the record as one text line with the given field delimiter.
    #[must_use]
    pub fn to_line(&self, delimiter: char) -> String {
        let f = &self.flight;
        format!(
            "{code}{d}{dest}{d}{cap}{d}{price}{d}{dur}{d}{dep}{d}{pax}",
            code = f.company_code,
            dest = f.destination_city,
            cap = f.seat_capacity,
            price = f.price,
            dur = f.duration,
            dep = self.departure.format(DEPARTURE_FORMAT),
            pax = self.passengers,
            d = delimiter,
        )
    }
}

impl std::fmt::Display for FlightOccupancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line(crate::loader::DEFAULT_DELIMITER))
    }
}
