//! Arrival forecasts for journal waypoints.
//!
//! Pace is the average distance over non-zero days. Each waypoint ahead of
//! the current mile marker gets `floor(remaining / pace)` days from now.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::Serialize;

use crate::entry::{JournalEntry, Waypoint, chronological};
use crate::stats::calculate_stats;

/// Display value for waypoints that are already behind the hiker.
pub const COMPLETE: &str = "Complete";

/// Arrival estimate for a single waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Arrival {
    /// The current mile marker is at or past the waypoint.
    Complete,
    /// Expected arrival at the current pace.
    Estimated { days: i64, date: NaiveDate },
    /// No entries or no hiking days yet, so no pace to project from.
    Unknown,
}

/// Forecast record for one waypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaypointForecast {
    pub waypoint: Waypoint,
    pub arrival: Arrival,
}

impl WaypointForecast {
    /// Whole days until arrival, if an estimate exists.
    pub const fn estimated_days_to_arrival(&self) -> Option<i64> {
        match self.arrival {
            Arrival::Estimated { days, .. } => Some(days),
            Arrival::Complete | Arrival::Unknown => None,
        }
    }

    /// Human-readable arrival date (`Friday, June 12`), or [`COMPLETE`].
    pub fn estimated_arrival_date(&self) -> Option<String> {
        match self.arrival {
            Arrival::Complete => Some(COMPLETE.to_string()),
            Arrival::Estimated { date, .. } => Some(format_arrival_date(date)),
            Arrival::Unknown => None,
        }
    }
}

/// Formats an arrival day as weekday, month and day of month.
pub fn format_arrival_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// Forecasts every waypoint relative to `now`.
///
/// Output order matches `waypoints`.
pub fn forecast_arrivals_at<Tz: TimeZone>(
    entries: &[JournalEntry],
    waypoints: &[Waypoint],
    now: DateTime<Tz>,
) -> Vec<WaypointForecast> {
    let sorted = chronological(entries);
    let Some(last) = sorted.last() else {
        return waypoints
            .iter()
            .map(|waypoint| WaypointForecast {
                waypoint: waypoint.clone(),
                arrival: Arrival::Unknown,
            })
            .collect();
    };

    let last_mile = last.end_mile();
    let pace = calculate_stats(entries).avg_miles_no_zeros;
    let today = now.date_naive();

    waypoints
        .iter()
        .map(|waypoint| WaypointForecast {
            waypoint: waypoint.clone(),
            arrival: estimate(waypoint.mile_marker, last_mile, pace, today),
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn estimate(target: f64, last_mile: f64, pace: f64, today: NaiveDate) -> Arrival {
    if last_mile >= target {
        return Arrival::Complete;
    }
    if pace <= 0.0 {
        return Arrival::Unknown;
    }
    let days = ((target - last_mile) / pace).floor();
    // Saturating cast.
    let days = days as i64;
    Duration::try_days(days)
        .and_then(|offset| today.checked_add_signed(offset))
        .map_or(Arrival::Unknown, |date| Arrival::Estimated { days, date })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::entry::day_start;
    use crate::types::JournalId;

    fn journal_id() -> JournalId {
        JournalId::new("journal-1").unwrap()
    }

    fn now() -> DateTime<Utc> {
        day_start(NaiveDate::from_ymd_opt(2026, 6, 2).unwrap()) + Duration::hours(15)
    }

    fn entry(day: u32, distance: &str, end_mile: &str) -> JournalEntry {
        let date = day_start(NaiveDate::from_ymd_opt(2026, 5, day).unwrap());
        let mut entry = JournalEntry::new(journal_id(), date);
        entry.distance_hiked = distance.to_string();
        entry.end_mile_marker = end_mile.to_string();
        entry
    }

    fn waypoint(name: &str, mile: f64) -> Waypoint {
        Waypoint::new(journal_id(), name, mile)
    }

    #[test]
    fn passed_waypoint_is_complete() {
        let entries = vec![entry(1, "10", "60")];
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Neels Gap", 50.0)], now());

        assert_eq!(forecasts[0].arrival, Arrival::Complete);
        assert_eq!(forecasts[0].estimated_days_to_arrival(), None);
        assert_eq!(forecasts[0].estimated_arrival_date().as_deref(), Some("Complete"));
    }

    #[test]
    fn waypoint_exactly_reached_is_complete() {
        let entries = vec![entry(1, "10", "50")];
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Shelter", 50.0)], now());
        assert_eq!(forecasts[0].arrival, Arrival::Complete);
    }

    #[test]
    fn waypoint_ahead_gets_days_and_date() {
        let entries = vec![entry(1, "10", "40"), entry(2, "10", "50")];
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Hot Springs", 100.0)], now());

        assert_eq!(forecasts[0].estimated_days_to_arrival(), Some(5));
        assert_eq!(
            forecasts[0].arrival,
            Arrival::Estimated {
                days: 5,
                date: NaiveDate::from_ymd_opt(2026, 6, 7).unwrap(),
            }
        );
        assert_eq!(
            forecasts[0].estimated_arrival_date().as_deref(),
            Some("Sunday, June 7")
        );
    }

    #[test]
    fn days_truncate_toward_zero() {
        let entries = vec![entry(1, "12", "12"), entry(2, "0", "12"), entry(3, "12", "24")];
        // pace 12, remaining 35 -> 2.9 days -> 2
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Road", 59.0)], now());
        assert_eq!(forecasts[0].estimated_days_to_arrival(), Some(2));
    }

    #[test]
    fn no_entries_yields_unknown_for_every_waypoint() {
        let waypoints = vec![waypoint("A", 10.0), waypoint("B", 0.0)];
        let forecasts = forecast_arrivals_at(&[], &waypoints, now());

        assert_eq!(forecasts.len(), 2);
        for forecast in &forecasts {
            assert_eq!(forecast.arrival, Arrival::Unknown);
            assert_eq!(forecast.estimated_days_to_arrival(), None);
            assert_eq!(forecast.estimated_arrival_date(), None);
        }
    }

    #[test]
    fn no_waypoints_yields_empty_forecast() {
        let entries = vec![entry(1, "10", "10")];
        assert!(forecast_arrivals_at(&entries, &[], now()).is_empty());
    }

    #[test]
    fn zero_pace_yields_unknown() {
        let entries = vec![entry(1, "0", "20"), entry(2, "", "20")];
        let forecasts = forecast_arrivals_at(
            &entries,
            &[waypoint("Ahead", 30.0), waypoint("Behind", 10.0)],
            now(),
        );
        assert_eq!(forecasts[0].arrival, Arrival::Unknown);
        assert_eq!(forecasts[1].arrival, Arrival::Complete);
    }

    #[test]
    fn current_position_comes_from_latest_entry() {
        // Inserted out of order; the latest day is at mile 30.
        let entries = vec![entry(3, "10", "30"), entry(1, "10", "10"), entry(2, "10", "20")];
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Gap", 25.0)], now());
        assert_eq!(forecasts[0].arrival, Arrival::Complete);
    }

    #[test]
    fn unparseable_end_marker_counts_as_mile_zero() {
        let entries = vec![entry(1, "10", "somewhere")];
        let forecasts = forecast_arrivals_at(&entries, &[waypoint("Mile 20", 20.0)], now());
        assert_eq!(forecasts[0].estimated_days_to_arrival(), Some(2));
    }

    #[test]
    fn output_keeps_input_order() {
        let entries = vec![entry(1, "10", "10")];
        let waypoints = vec![waypoint("Far", 300.0), waypoint("Near", 20.0), waypoint("Mid", 90.0)];
        let names: Vec<String> = forecast_arrivals_at(&entries, &waypoints, now())
            .into_iter()
            .map(|f| f.waypoint.name)
            .collect();
        assert_eq!(names, vec!["Far", "Near", "Mid"]);
    }

    #[test]
    fn forecast_is_idempotent() {
        let entries = vec![entry(1, "9", "9"), entry(2, "11", "20")];
        let waypoints = vec![waypoint("A", 64.0)];
        assert_eq!(
            forecast_arrivals_at(&entries, &waypoints, now()),
            forecast_arrivals_at(&entries, &waypoints, now())
        );
    }

    #[test]
    fn arrival_serializes_with_status_tag() {
        let json = serde_json::to_string(&Arrival::Estimated {
            days: 3,
            date: NaiveDate::from_ymd_opt(2026, 6, 5).unwrap(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"estimated","days":3,"date":"2026-06-05"}"#);
        assert_eq!(
            serde_json::to_string(&Arrival::Complete).unwrap(),
            r#"{"status":"complete"}"#
        );
    }
}
