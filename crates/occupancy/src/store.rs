//! In-memory record store for occupancy.
//!
//! The store owns the active snapshot of [`FlightOccupancy`] records. Loading
//! replaces the snapshot wholesale; readers hold a [`Snapshot`] handle and
//! keep seeing the records that were active when they took it.

use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::model::FlightOccupancy;
use crate::query::QueryEngine;

/// An immutable view of the records active at some instant.
///
/// Cloning is cheap: all clones share the same backing slice.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<[FlightOccupancy]>);

impl Snapshot {
    /// Create a snapshot owning the given records.
    #[must_use]
    pub fn new(records: Vec<FlightOccupancy>) -> Self {
        Self(records.into())
    }

    /// The records in store order.
    #[must_use]
    pub fn records(&self) -> &[FlightOccupancy] {
        &self.0
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deref for Snapshot {
    type Target = [FlightOccupancy];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Holder of the active record snapshot.
///
/// `load` is the only mutator. It swaps the snapshot under a write lock, so
/// queries running against a previously taken snapshot are unaffected and no
/// reader can observe a partially replaced record set.
#[derive(Debug, Default)]
pub struct RecordStore {
    active: RwLock<Snapshot>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding the given records.
    #[must_use]
    pub fn with_records(records: Vec<FlightOccupancy>) -> Self {
        Self {
            active: RwLock::new(Snapshot::new(records)),
        }
    }

    /// Replace the active snapshot with `records`.
    pub fn load(&self, records: Vec<FlightOccupancy>) {
        let snapshot = Snapshot::new(records);
        let count = snapshot.len();

        // The guarded value is a single handle, so a poisoned lock can't hold
        // a half-written snapshot.
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *active, snapshot);
        drop(active);

        debug!("Replaced snapshot of {} records", previous.len());
        info!("Loaded {} occupancy records", count);
    }

    /// Get the active snapshot.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get a query engine bound to the active snapshot.
    #[must_use]
    pub fn query(&self) -> QueryEngine {
        QueryEngine::new(self.current())
    }

    /// Number of records in the active snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether the active snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Flight;
    use chrono::NaiveDate;

    fn record(destination: &str, passengers: u32) -> FlightOccupancy {
        let departure = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        FlightOccupancy::new(
            Flight::new("VY1000", destination, 100, 80.0, 60),
            departure,
            passengers,
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.current().records().is_empty());
    }

    #[test]
    fn test_with_records() {
        let store = RecordStore::with_records(vec![record("Madrid", 1), record("Roma", 2)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.current()[1].destination(), "Roma");
    }

    #[test]
    fn test_load_replaces_wholesale() {
        crate::logging::init_test_logging();

        let store = RecordStore::new();
        store.load(vec![record("Madrid", 1), record("Roma", 2)]);
        assert_eq!(store.len(), 2);

        store.load(vec![record("Paris", 3)]);
        let snapshot = store.current();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].destination(), "Paris");
    }

    #[test]
    fn test_load_empty_is_valid() {
        let store = RecordStore::with_records(vec![record("Madrid", 1)]);
        store.load(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_held_snapshot_survives_reload() {
        let store = RecordStore::with_records(vec![record("Madrid", 1), record("Roma", 2)]);
        let before = store.current();

        store.load(vec![record("Paris", 3)]);

        assert_eq!(before.len(), 2);
        assert_eq!(before[0].destination(), "Madrid");
        assert_eq!(store.current().len(), 1);
    }

    #[test]
    fn test_snapshot_clone_shares_records() {
        let snapshot = Snapshot::new(vec![record("Madrid", 1)]);
        let clone = snapshot.clone();
        assert!(std::ptr::eq(snapshot.records(), clone.records()));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(RecordStore::with_records(vec![record("Madrid", 1); 10]));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let len = store.current().len();
                        assert!(len == 10 || len == 20);
                    }
                })
            })
            .collect();

        store.load(vec![record("Roma", 2); 20]);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordStore>();
        assert_send_sync::<Snapshot>();
    }
}
