//! Core domain logic for the trail journal.
//!
//! This crate contains the fundamental types and logic for:
//! - Journals, daily entries and forecast waypoints
//! - Lenient parsing of the free-text numeric entry fields
//! - Trip statistics: distance averages, elevation totals, amenity streaks
//! - Arrival forecasts for waypoints at the current pace
//! - View state that recomputes both from pushed storage snapshots

pub mod entry;
pub mod forecast;
pub mod parse;
pub mod stats;
pub mod types;
pub mod view;

pub use entry::{Journal, JournalEntry, Waypoint};
pub use forecast::{Arrival, COMPLETE, WaypointForecast, forecast_arrivals_at};
pub use stats::{StatsReport, TripStats, calculate_stats};
pub use types::{EntryId, JournalId, Rating, ValidationError, WaypointId};
pub use view::{JournalSnapshot, JournalView};
