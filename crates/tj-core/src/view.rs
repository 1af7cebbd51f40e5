//! View state bridging storage snapshots and the calculators.
//!
//! Storage pushes a [`JournalSnapshot`] after every change. A [`JournalView`]
//! recomputes stats and forecasts from each one and keeps only the newest
//! revision, so a late-arriving stale snapshot never overwrites fresh results.

use std::sync::mpsc::Receiver;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::entry::{JournalEntry, Waypoint};
use crate::forecast::{WaypointForecast, forecast_arrivals_at};
use crate::stats::{TripStats, calculate_stats};
use crate::types::JournalId;

/// Immutable copy of one journal's entries and waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalSnapshot {
    pub journal_id: JournalId,
    /// Monotonic per storage handle; higher is newer.
    pub revision: u64,
    pub entries: Vec<JournalEntry>,
    pub waypoints: Vec<Waypoint>,
}

/// Latest derived results for a journal.
#[derive(Debug, Clone, Default)]
pub struct JournalView {
    revision: Option<u64>,
    stats: TripStats,
    forecasts: Vec<WaypointForecast>,
}

impl JournalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes from `snapshot` using the local wall clock.
    ///
    /// Returns `false` and leaves the view untouched when the snapshot is not
    /// newer than the one already applied.
    pub fn apply(&mut self, snapshot: &JournalSnapshot) -> bool {
        self.apply_at(snapshot, Local::now())
    }

    /// Like [`apply`](Self::apply), forecasting relative to `now`.
    pub fn apply_at<Tz: TimeZone>(&mut self, snapshot: &JournalSnapshot, now: DateTime<Tz>) -> bool {
        if self.revision.is_some_and(|current| snapshot.revision <= current) {
            tracing::debug!(
                journal = %snapshot.journal_id,
                revision = snapshot.revision,
                current = ?self.revision,
                "ignoring stale snapshot"
            );
            return false;
        }

        self.stats = calculate_stats(&snapshot.entries);
        self.forecasts = forecast_arrivals_at(&snapshot.entries, &snapshot.waypoints, now);
        self.revision = Some(snapshot.revision);
        tracing::debug!(
            journal = %snapshot.journal_id,
            revision = snapshot.revision,
            entries = snapshot.entries.len(),
            waypoints = snapshot.waypoints.len(),
            "recomputed journal view"
        );
        true
    }

    /// Applies every snapshot already waiting on `receiver` without blocking.
    ///
    /// Returns how many snapshots were accepted.
    pub fn drain(&mut self, receiver: &Receiver<JournalSnapshot>) -> usize {
        receiver
            .try_iter()
            .filter(|snapshot| self.apply(snapshot))
            .count()
    }

    /// Revision of the snapshot the current results came from.
    pub const fn revision(&self) -> Option<u64> {
        self.revision
    }

    pub const fn stats(&self) -> &TripStats {
        &self.stats
    }

    pub fn forecasts(&self) -> &[WaypointForecast] {
        &self.forecasts
    }
}
