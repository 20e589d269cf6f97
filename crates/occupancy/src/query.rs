//! Analytical queries over a record snapshot.
//!
//! Every operation is a pure function of the snapshot the engine was built
//! with: nothing is cached between calls and the snapshot is never mutated.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::FlightOccupancy;
use crate::store::Snapshot;

/// Query engine bound to one snapshot of the record store.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    snapshot: Snapshot,
}

impl QueryEngine {
    /// Create an engine over the given snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// The snapshot this engine reads.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn records(&self) -> impl Iterator<Item = &FlightOccupancy> {
        self.snapshot.iter()
    }

    fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &FlightOccupancy> {
        self.records().filter(move |r| r.departure_date() == date)
    }

    /// Total passengers flying to destinations that start with `prefix`.
    ///
    /// Matching is case-sensitive. Returns 0 when nothing matches.
    #[must_use]
    pub fn total_passengers_to_prefix(&self, prefix: &str) -> u64 {
        self.records()
            .filter(|r| r.destination().starts_with(prefix))
            .map(|r| u64::from(r.passengers))
            .sum()
    }

    /// Whether any departure on `date` flies to one of `destinations`.
    #[must_use]
    pub fn has_destination_on_date(&self, destinations: &HashSet<String>, date: NaiveDate) -> bool {
        self.on_date(date)
            .any(|r| destinations.contains(r.destination()))
    }

    /// Distinct destinations with a departure on `date`.
    #[must_use]
    pub fn distinct_destinations_on_date(&self, date: NaiveDate) -> BTreeSet<String> {
        self.on_date(date)
            .map(|r| r.destination().to_string())
            .collect()
    }

    /// Passengers per destination for departures in `year`.
    ///
    /// The result is ordered by destination, descending. Destinations with
    /// no departures that year are not listed.
    #[must_use]
    pub fn total_passengers_by_destination(&self, year: i32) -> Vec<(String, u64)> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for r in self.records().filter(|r| r.departure.year() == year) {
            *totals.entry(r.destination()).or_default() += u64::from(r.passengers);
        }

        totals
            .into_iter()
            .rev()
            .map(|(destination, total)| (destination.to_string(), total))
            .collect()
    }

    /// Company code of the earliest flight to `destination` that departs
    /// strictly after `now` and still has free seats.
    ///
    /// Ties on departure go to the record that comes first in the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAvailableFlight`] when no record qualifies.
    pub fn first_available_flight(&self, destination: &str, now: NaiveDateTime) -> Result<String> {
        let found = self
            .records()
            .filter(|r| r.destination() == destination && r.has_free_seats())
            .filter(|r| r.departure > now)
            .min_by_key(|r| r.departure);

        match found {
            Some(r) => {
                debug!(
                    "First available flight to {} departs {}",
                    destination, r.departure
                );
                Ok(r.flight.company_code.clone())
            }
            None => Err(Error::NoAvailableFlight {
                destination: destination.to_string(),
            }),
        }
    }

    /// Mean price per destination over fully booked records.
    ///
    /// Destinations without a single full record are absent.
    #[must_use]
    pub fn average_price_of_full_flights(&self) -> BTreeMap<String, f64> {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for r in self.records().filter(|r| r.is_full()) {
            let (sum, count) = groups.entry(r.destination()).or_default();
            *sum += r.flight.price;
            *count += 1;
        }

        groups
            .into_iter()
            .map(|(destination, (sum, count))| (destination.to_string(), mean(sum, count)))
            .collect()
    }

    /// Destinations per departure date, sorted by flight duration ascending.
    ///
    /// Equal durations keep store order. The whole sorted list is returned
    /// for each date; `_n` does not truncate it.
    #[must_use]
    pub fn destinations_by_duration_per_date(&self, _n: usize) -> BTreeMap<NaiveDate, Vec<String>> {
        let mut groups: BTreeMap<NaiveDate, Vec<&FlightOccupancy>> = BTreeMap::new();
        for r in self.records() {
            groups.entry(r.departure_date()).or_default().push(r);
        }
        trace!("Grouped records into {} dates", groups.len());

        groups
            .into_iter()
            .map(|(date, mut group)| {
                // Stable sort keeps store order for equal durations.
                group.sort_by_key(|r| r.flight.duration);
                let destinations = group.iter().map(|r| r.destination().to_string()).collect();
                (date, destinations)
            })
            .collect()
    }

    /// Mean price of flights departing strictly after `after`.
    ///
    /// Returns exactly `0.0` when no flight qualifies.
    #[must_use]
    pub fn average_price_after(&self, after: NaiveDateTime) -> f64 {
        let (sum, count) = self
            .records()
            .filter(|r| r.departure > after)
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.flight.price, count + 1));
        mean(sum, count)
    }

    /// Distinct departure dates per destination.
    #[must_use]
    pub fn dates_by_destination(&self) -> BTreeMap<String, BTreeSet<NaiveDate>> {
        let mut dates: BTreeMap<String, BTreeSet<NaiveDate>> = BTreeMap::new();
        for r in self.records() {
            dates
                .entry(r.destination().to_string())
                .or_default()
                .insert(r.departure_date());
        }
        dates
    }

    /// Number of distinct departure date-times per destination.
    ///
    /// Two departures on the same day at different times count twice, unlike
    /// [`Self::dates_by_destination`], which works at day granularity.
    #[must_use]
    pub fn distinct_departure_count_by_destination(&self) -> BTreeMap<String, usize> {
        let mut departures: HashMap<&str, HashSet<NaiveDateTime>> = HashMap::new();
        for r in self.records() {
            departures
                .entry(r.destination())
                .or_default()
                .insert(r.departure);
        }

        departures
            .into_iter()
            .map(|(destination, set)| (destination.to_string(), set.len()))
            .collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Flight;
    use crate::store::RecordStore;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        code: &str,
        destination: &str,
        capacity: u32,
        price: f64,
        duration: u32,
        departure: NaiveDateTime,
        passengers: u32,
    ) -> FlightOccupancy {
        FlightOccupancy::new(
            Flight::new(code, destination, capacity, price, duration),
            departure,
            passengers,
        )
    }

    fn engine(records: Vec<FlightOccupancy>) -> QueryEngine {
        QueryEngine::new(Snapshot::new(records))
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    /// The three-record scenario: two full Madrid flights, one Sevilla flight
    /// with free seats.
    fn scenario() -> RecordStore {
        let store = RecordStore::new();
        store.load(vec![
            record("IB1", "Madrid", 2, 100.0, 60, at(2024, 1, 1, 10, 0), 2),
            record("IB2", "Madrid", 2, 200.0, 60, at(2024, 1, 1, 12, 0), 2),
            record("VY3", "Sevilla", 5, 50.0, 70, at(2024, 1, 1, 9, 0), 3),
        ]);
        store
    }

    #[test]
    fn test_end_to_end_scenario() {
        let q = scenario().query();

        assert_eq!(q.total_passengers_to_prefix("Mad"), 4);

        let averages = q.average_price_of_full_flights();
        assert_eq!(averages.get("Madrid"), Some(&150.0));
        assert!(!averages.contains_key("Sevilla"));

        let dates = q.dates_by_destination();
        assert_eq!(dates["Madrid"], BTreeSet::from([date(2024, 1, 1)]));

        assert_eq!(q.distinct_departure_count_by_destination()["Madrid"], 2);
    }

    #[test]
    fn test_empty_store_defaults() {
        let q = RecordStore::new().query();

        assert_eq!(q.total_passengers_to_prefix(""), 0);
        assert!(!q.has_destination_on_date(&set(&["Madrid"]), date(2024, 1, 1)));
        assert!(q.distinct_destinations_on_date(date(2024, 1, 1)).is_empty());
        assert!(q.total_passengers_by_destination(2024).is_empty());
        assert!(q.average_price_of_full_flights().is_empty());
        assert!(q.destinations_by_duration_per_date(3).is_empty());
        assert_eq!(q.average_price_after(at(2000, 1, 1, 0, 0)), 0.0);
        assert!(q.dates_by_destination().is_empty());
        assert!(q.distinct_departure_count_by_destination().is_empty());
        assert!(q
            .first_available_flight("Madrid", at(2000, 1, 1, 0, 0))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_prefix_is_case_sensitive_and_exact() {
        let q = engine(vec![
            record("A", "Madrid", 10, 1.0, 1, at(2024, 1, 1, 0, 0), 3),
            record("B", "Malaga", 10, 1.0, 1, at(2024, 1, 2, 0, 0), 5),
            record("C", "madrid", 10, 1.0, 1, at(2024, 1, 3, 0, 0), 7),
        ]);

        assert_eq!(q.total_passengers_to_prefix("Ma"), 8);
        assert_eq!(q.total_passengers_to_prefix("Mad"), 3);
        assert_eq!(q.total_passengers_to_prefix("mad"), 7);
        assert_eq!(q.total_passengers_to_prefix(""), 15);
        assert_eq!(q.total_passengers_to_prefix("Madrid!"), 0);
    }

    #[test]
    fn test_has_destination_on_date_is_monotonic() {
        let q = engine(vec![
            record("A", "Madrid", 10, 1.0, 1, at(2024, 2, 1, 23, 59), 1),
            record("B", "Roma", 10, 1.0, 1, at(2024, 2, 2, 0, 0), 1),
        ]);
        let day = date(2024, 2, 1);

        assert!(!q.has_destination_on_date(&HashSet::new(), day));
        assert!(!q.has_destination_on_date(&set(&["Roma"]), day));
        assert!(q.has_destination_on_date(&set(&["Roma", "Madrid"]), day));
        assert!(q.has_destination_on_date(&set(&["Roma", "Madrid", "Paris"]), day));
        assert!(q.has_destination_on_date(&set(&["Roma"]), date(2024, 2, 2)));
    }

    #[test]
    fn test_distinct_destinations_on_date() {
        let q = engine(vec![
            record("A", "Madrid", 10, 1.0, 1, at(2024, 2, 1, 8, 0), 1),
            record("B", "Madrid", 10, 1.0, 1, at(2024, 2, 1, 9, 0), 1),
            record("C", "Roma", 10, 1.0, 1, at(2024, 2, 1, 10, 0), 1),
            record("D", "Paris", 10, 1.0, 1, at(2024, 2, 2, 10, 0), 1),
        ]);

        let destinations = q.distinct_destinations_on_date(date(2024, 2, 1));
        assert_eq!(
            destinations,
            BTreeSet::from(["Madrid".to_string(), "Roma".to_string()])
        );
        let on_date = q.on_date(date(2024, 2, 1)).count();
        assert!(destinations.len() <= on_date);
    }

    #[test]
    fn test_total_passengers_by_destination_descending() {
        let q = engine(vec![
            record("A", "Barcelona", 10, 1.0, 1, at(2024, 1, 5, 8, 0), 4),
            record("B", "Roma", 10, 1.0, 1, at(2024, 6, 1, 8, 0), 2),
            record("C", "Madrid", 10, 1.0, 1, at(2024, 12, 31, 23, 59), 6),
            record("D", "Roma", 10, 1.0, 1, at(2024, 7, 1, 8, 0), 3),
            record("E", "Zurich", 10, 1.0, 1, at(2023, 12, 31, 23, 59), 9),
            record("F", "Madrid", 10, 1.0, 1, at(2025, 1, 1, 0, 0), 8),
        ]);

        let totals = q.total_passengers_by_destination(2024);
        assert_eq!(
            totals,
            vec![
                ("Roma".to_string(), 5),
                ("Madrid".to_string(), 6),
                ("Barcelona".to_string(), 4),
            ]
        );
        assert!(totals.windows(2).all(|w| w[0].0 > w[1].0));
    }

    #[test]
    fn test_first_available_flight_picks_earliest_future_with_seats() {
        let now = at(2024, 6, 1, 12, 0);
        let q = engine(vec![
            // in the past
            record("PAST", "Madrid", 10, 1.0, 1, at(2024, 6, 1, 11, 0), 0),
            // exactly now, not strictly after
            record("NOW", "Madrid", 10, 1.0, 1, now, 0),
            // full
            record("FULL", "Madrid", 10, 1.0, 1, at(2024, 6, 1, 13, 0), 10),
            // overbooked
            record("OVER", "Madrid", 10, 1.0, 1, at(2024, 6, 1, 13, 30), 12),
            // other destination
            record("ROMA", "Roma", 10, 1.0, 1, at(2024, 6, 1, 12, 30), 0),
            record("LATER", "Madrid", 10, 1.0, 1, at(2024, 6, 2, 8, 0), 9),
            record("FIRST", "Madrid", 10, 1.0, 1, at(2024, 6, 1, 14, 0), 3),
        ]);

        assert_eq!(q.first_available_flight("Madrid", now).unwrap(), "FIRST");
        assert_eq!(q.first_available_flight("Roma", now).unwrap(), "ROMA");
    }

    #[test]
    fn test_first_available_flight_tie_goes_to_store_order() {
        let departure = at(2024, 6, 1, 14, 0);
        let q = engine(vec![
            record("IB", "Madrid", 10, 1.0, 1, departure, 0),
            record("VY", "Madrid", 10, 1.0, 1, departure, 0),
        ]);

        assert_eq!(
            q.first_available_flight("Madrid", at(2024, 1, 1, 0, 0))
                .unwrap(),
            "IB"
        );
    }

    #[test]
    fn test_first_available_flight_not_found() {
        let q = scenario().query();

        let err = q
            .first_available_flight("Lisboa", at(2020, 1, 1, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NoAvailableFlight { ref destination } if destination == "Lisboa"
        ));

        // Madrid flights are all full.
        assert!(q
            .first_available_flight("Madrid", at(2020, 1, 1, 0, 0))
            .is_err());
        // Sevilla has seats but has already departed.
        assert!(q
            .first_available_flight("Sevilla", at(2024, 1, 1, 9, 0))
            .is_err());
    }

    #[test]
    fn test_average_price_of_full_flights_excludes_non_full() {
        let q = engine(vec![
            record("A", "Madrid", 2, 100.0, 1, at(2024, 1, 1, 0, 0), 2),
            record("B", "Madrid", 2, 300.0, 1, at(2024, 1, 2, 0, 0), 1),
            record("C", "Roma", 3, 80.0, 1, at(2024, 1, 3, 0, 0), 4),
            record("D", "Paris", 1, 40.0, 1, at(2024, 1, 4, 0, 0), 1),
            record("E", "Paris", 1, 60.0, 1, at(2024, 1, 5, 0, 0), 1),
        ]);

        let averages = q.average_price_of_full_flights();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages["Madrid"], 100.0);
        assert_eq!(averages["Paris"], 50.0);
        assert!(!averages.contains_key("Roma"));
    }

    #[test]
    fn test_destinations_by_duration_per_date() {
        let q = engine(vec![
            record("A", "Roma", 10, 1.0, 150, at(2024, 3, 1, 8, 0), 1),
            record("B", "Madrid", 10, 1.0, 60, at(2024, 3, 1, 9, 0), 1),
            record("C", "Paris", 10, 1.0, 150, at(2024, 3, 1, 10, 0), 1),
            record("D", "Lisboa", 10, 1.0, 90, at(2024, 3, 1, 11, 0), 1),
            record("E", "Berlin", 10, 1.0, 200, at(2024, 3, 2, 8, 0), 1),
        ]);

        let by_date = q.destinations_by_duration_per_date(2);
        assert_eq!(by_date.len(), 2);
        assert_eq!(
            by_date[&date(2024, 3, 1)],
            vec!["Madrid", "Lisboa", "Roma", "Paris"]
        );
        assert_eq!(by_date[&date(2024, 3, 2)], vec!["Berlin"]);
    }

    #[test]
    fn test_destinations_by_duration_ignores_n() {
        let q = scenario().query();
        assert_eq!(
            q.destinations_by_duration_per_date(0),
            q.destinations_by_duration_per_date(100)
        );
        assert_eq!(q.destinations_by_duration_per_date(1)[&date(2024, 1, 1)].len(), 3);
    }

    #[test]
    fn test_average_price_after_is_strict() {
        let q = scenario().query();

        assert_eq!(q.average_price_after(at(2023, 12, 31, 0, 0)), 350.0 / 3.0);
        // 10:00 itself is excluded.
        assert_eq!(q.average_price_after(at(2024, 1, 1, 10, 0)), 200.0);
        assert_eq!(q.average_price_after(at(2024, 1, 1, 12, 0)), 0.0);
        assert_eq!(q.average_price_after(at(2030, 1, 1, 0, 0)), 0.0);
    }

    #[test]
    fn test_dates_and_departure_counts_differ_in_granularity() {
        let q = engine(vec![
            record("A", "Roma", 10, 1.0, 1, at(2024, 4, 1, 8, 0), 1),
            record("B", "Roma", 10, 1.0, 1, at(2024, 4, 1, 18, 0), 1),
            record("C", "Roma", 10, 1.0, 1, at(2024, 4, 1, 18, 0), 1),
            record("D", "Roma", 10, 1.0, 1, at(2024, 4, 3, 8, 0), 1),
            record("E", "Oslo", 10, 1.0, 1, at(2024, 4, 2, 8, 0), 1),
        ]);

        let dates = q.dates_by_destination();
        let counts = q.distinct_departure_count_by_destination();

        assert_eq!(
            dates["Roma"],
            BTreeSet::from([date(2024, 4, 1), date(2024, 4, 3)])
        );
        assert_eq!(counts["Roma"], 3);
        assert_eq!(dates["Oslo"].len(), 1);
        assert_eq!(counts["Oslo"], 1);
        assert_eq!(
            dates.keys().collect::<Vec<_>>(),
            counts.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_same_date_two_times() {
        let q = engine(vec![
            record("A", "Madrid", 10, 1.0, 1, at(2024, 1, 1, 10, 0), 1),
            record("B", "Madrid", 10, 1.0, 1, at(2024, 1, 1, 12, 0), 1),
        ]);

        assert_eq!(q.dates_by_destination()["Madrid"].len(), 1);
        assert_eq!(q.distinct_departure_count_by_destination()["Madrid"], 2);
    }

    #[test]
    fn test_engine_keeps_its_snapshot_after_reload() {
        let store = scenario();
        let q = store.query();

        store.load(Vec::new());

        assert_eq!(q.snapshot().len(), 3);
        assert_eq!(q.total_passengers_to_prefix(""), 7);
        assert_eq!(store.query().total_passengers_to_prefix(""), 0);
    }
}
