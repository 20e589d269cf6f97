//! `occupancy` - In-memory analytical queries over flight occupancy records
//!
//! This library holds a snapshot of occupancy records in a [`RecordStore`] and
//! answers questions about passengers, prices, and departure dates through a
//! [`QueryEngine`]. Records come from the line-oriented [`loader`] format or
//! from the synthetic [`generator`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod logging;
pub mod model;
pub mod query;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use generator::Generator;
pub use logging::init_logging;
pub use model::{Flight, FlightOccupancy};
pub use query::QueryEngine;
pub use store::{RecordStore, Snapshot};
