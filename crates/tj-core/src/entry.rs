//! Journals, daily entries and forecast waypoints.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::parse::{net_elevation, parse_distance, parse_elevation};
use crate::types::{EntryId, JournalId, Rating, WaypointId};

/// A single multi-day trip. Owns its entries and waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Journal {
    /// Creates a journal with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: JournalId::generate(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// One day of recorded activity within a journal.
///
/// Numeric fields are kept as the text the user typed. Use the accessor
/// methods to read them as numbers; malformed text reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub journal_id: JournalId,
    /// The day this entry represents.
    pub date: DateTime<Utc>,
    pub distance_hiked: String,
    pub start_mile_marker: String,
    pub end_mile_marker: String,
    pub elevation_start: String,
    pub elevation_end: String,
    pub net_elevation_change: String,
    pub slept_in_bed: bool,
    pub took_shower: bool,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub end_location: String,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub trail_conditions: String,
    #[serde(default)]
    pub wildlife: String,
    #[serde(default)]
    pub resupply: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl JournalEntry {
    /// Creates an empty entry for the given day.
    pub fn new(journal_id: JournalId, date: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(),
            journal_id,
            date,
            distance_hiked: String::new(),
            start_mile_marker: String::new(),
            end_mile_marker: String::new(),
            elevation_start: String::new(),
            elevation_end: String::new(),
            net_elevation_change: String::new(),
            slept_in_bed: false,
            took_shower: false,
            start_location: String::new(),
            end_location: String::new(),
            weather: String::new(),
            trail_conditions: String::new(),
            wildlife: String::new(),
            resupply: String::new(),
            notes: String::new(),
            rating: None,
        }
    }

    /// Distance hiked, `0.0` when the text does not parse.
    pub fn distance(&self) -> f64 {
        parse_distance(&self.distance_hiked)
    }

    /// End-of-day trail position, `0.0` when the text does not parse.
    pub fn end_mile(&self) -> f64 {
        parse_distance(&self.end_mile_marker)
    }

    /// Net elevation change, `0` when the text does not parse.
    pub fn net_elevation(&self) -> i64 {
        parse_elevation(&self.net_elevation_change)
    }

    /// Fills `net_elevation_change` from the start/end elevations.
    ///
    /// Only applies when the net field is blank and both elevations are
    /// present. Returns whether the field was filled.
    pub fn fill_net_elevation(&mut self) -> bool {
        if !self.net_elevation_change.trim().is_empty() {
            return false;
        }
        match net_elevation(&self.elevation_start, &self.elevation_end) {
            Some(net) => {
                self.net_elevation_change = net.to_string();
                true
            }
            None => false,
        }
    }

    /// Entry date as milliseconds since the Unix epoch.
    pub fn date_millis(&self) -> i64 {
        self.date.timestamp_millis()
    }
}

/// A trail landmark the user wants an arrival estimate for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub journal_id: JournalId,
    pub name: String,
    pub mile_marker: f64,
}

impl Waypoint {
    /// Creates a waypoint with a fresh ID.
    pub fn new(journal_id: JournalId, name: impl Into<String>, mile_marker: f64) -> Self {
        Self {
            id: WaypointId::generate(),
            journal_id,
            name: name.into(),
            mile_marker,
        }
    }
}

/// Converts epoch milliseconds to a UTC timestamp.
///
/// Out-of-range values clamp to the Unix epoch.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Midnight UTC of a calendar day.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Returns the entries ordered by date, oldest first.
///
/// The sort is stable: entries sharing a date keep their input order.
pub fn chronological(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    let mut sorted: Vec<&JournalEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.date);
    sorted
}
