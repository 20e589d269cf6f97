//! Synthetic occupancy records.
//!
//! Wraps a `ChaCha8Rng` so that the same seed always produces the same
//! record set, which keeps generated fixtures reproducible across platforms.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Flight, FlightOccupancy};

/// Destinations drawn from when generating records.
pub const DESTINATIONS: &[&str] = &[
    "Amsterdam",
    "Barcelona",
    "Berlin",
    "Dublin",
    "Lisboa",
    "Londres",
    "Madrid",
    "Malaga",
    "Paris",
    "Roma",
    "Sevilla",
    "Valencia",
];

/// Airline prefixes for generated company codes.
const AIRLINES: &[&str] = &["IB", "VY", "UX", "FR", "U2", "LH", "AF"];

/// Deterministic generator of plausible occupancy records.
#[derive(Debug)]
pub struct Generator {
    rng: ChaCha8Rng,
}

impl Generator {
    /// Create a generator seeded from the given value.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a generator with a random seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    /// Generate a random flight.
    pub fn flight(&mut self) -> Flight {
        let airline = AIRLINES[self.rng.gen_range(0..AIRLINES.len())];
        let destination = DESTINATIONS[self.rng.gen_range(0..DESTINATIONS.len())];
        let number: u16 = self.rng.gen_range(1000..10_000);
        let cents: u32 = self.rng.gen_range(2_000..=50_000);

        Flight::new(
            format!("{airline}{number}"),
            destination,
            self.rng.gen_range(50..=300),
            f64::from(cents) / 100.0,
            self.rng.gen_range(45..=600),
        )
    }

    /// Generate a random departure in `year`, on a quarter hour.
    ///
    /// # Errors
    ///
    /// Returns an error if `year` is outside the supported calendar range.
    pub fn departure(&mut self, year: i32) -> Result<NaiveDateTime> {
        let out_of_range = || Error::internal(format!("cannot build a departure in year {year}"));
        let days = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(out_of_range)?
            .ordinal();

        let ordinal = self.rng.gen_range(1..=days);
        let hour = self.rng.gen_range(0..24);
        let minute = self.rng.gen_range(0..4) * 15;

        NaiveDate::from_yo_opt(year, ordinal)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(out_of_range)
    }

    /// Generate one occupancy of a random flight in `year`.
    ///
    /// About one in five records is exactly full.
    ///
    /// # Errors
    ///
    /// Returns an error if `year` is outside the supported calendar range.
    pub fn occupancy(&mut self, year: i32) -> Result<FlightOccupancy> {
        let flight = self.flight();
        let departure = self.departure(year)?;
        let passengers = if self.rng.gen_bool(0.2) {
            flight.seat_capacity
        } else {
            self.rng.gen_range(0..=flight.seat_capacity)
        };
        Ok(FlightOccupancy::new(flight, departure, passengers))
    }

    /// Generate `count` records departing in `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if `year` is outside the supported calendar range.
    pub fn generate(&mut self, count: usize, year: i32) -> Result<Vec<FlightOccupancy>> {
        let records = (0..count)
            .map(|_| self.occupancy(year))
            .collect::<Result<Vec<_>>>()?;
        info!("Generated {} records for {}", records.len(), year);
        Ok(records)
    }
}
