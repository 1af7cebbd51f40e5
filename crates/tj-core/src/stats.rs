//! Trip statistics derived from a journal's entries.
//!
//! Everything here is recomputed from scratch on each call. Malformed
//! numeric text counts as zero and an empty journal yields a zeroed report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entry::{JournalEntry, chronological};

/// Number of days normalized into a week for [`TripStats::avg_miles_per_week`].
const DAYS_PER_WEEK: f64 = 7.0;

/// Derived metrics for one journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TripStats {
    pub total_days: usize,
    pub total_distance: f64,
    /// Days with a parsed distance of exactly zero.
    pub total_zeros: usize,
    pub avg_miles_per_day: f64,
    /// Total distance spread over the non-zero days only.
    pub avg_miles_no_zeros: f64,
    /// Unscaled total distance when fewer than seven days are logged.
    pub avg_miles_per_week: f64,
    pub highest_mileage_day: f64,
    pub total_net_ascent: i64,
    /// Sum of the negative net changes; zero or negative.
    pub total_net_descent: i64,
    pub biggest_ascent_day: i64,
    pub biggest_descent_day: i64,
    pub days_in_bed: usize,
    pub days_on_ground: usize,
    pub total_showers: usize,
    pub days_since_last_zero: usize,
    pub days_since_last_shower: usize,
    pub max_days_without_shower: usize,
    /// End mile marker of the most recent entry.
    pub current_mile_marker: f64,
    pub first_day: Option<DateTime<Utc>>,
    pub last_day: Option<DateTime<Utc>>,
}

/// [`TripStats`] rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub total_days: String,
    pub total_distance: String,
    pub total_zeros: String,
    pub avg_miles_per_day: String,
    pub avg_miles_no_zeros: String,
    pub avg_miles_per_week: String,
    pub highest_mileage_day: String,
    pub total_net_ascent: String,
    pub total_net_descent: String,
    pub biggest_ascent_day: String,
    pub biggest_descent_day: String,
    pub days_in_bed: String,
    pub days_on_ground: String,
    pub total_showers: String,
    pub days_since_last_zero: String,
    pub days_since_last_shower: String,
    pub max_days_without_shower: String,
    pub current_mile_marker: String,
}

/// Computes statistics over a journal's entries.
///
/// Entries may arrive in any order; they are sorted by date first.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_stats(entries: &[JournalEntry]) -> TripStats {
    let sorted = chronological(entries);
    if sorted.is_empty() {
        return TripStats::default();
    }

    let distances: Vec<f64> = sorted.iter().map(|e| e.distance()).collect();
    let nets: Vec<i64> = sorted.iter().map(|e| e.net_elevation()).collect();

    let total_days = sorted.len();
    let mut total_distance: f64 = distances.iter().sum();
    if !total_distance.is_finite() {
        tracing::warn!(total_distance, "distance total overflowed, reporting zero");
        total_distance = 0.0;
    }
    let total_zeros = distances.iter().filter(|d| is_zero_day(**d)).count();
    let hiking_days = total_days - total_zeros;

    let avg_miles_no_zeros = if hiking_days == 0 {
        0.0
    } else {
        total_distance / hiking_days as f64
    };
    let avg_miles_per_week = if total_days >= 7 {
        total_distance / (total_days as f64 / DAYS_PER_WEEK)
    } else {
        total_distance
    };
    let highest_mileage_day = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let days_in_bed = sorted.iter().filter(|e| e.slept_in_bed).count();
    let total_showers = sorted.iter().filter(|e| e.took_shower).count();

    TripStats {
        total_days,
        total_distance,
        total_zeros,
        avg_miles_per_day: total_distance / total_days as f64,
        avg_miles_no_zeros,
        avg_miles_per_week,
        highest_mileage_day,
        total_net_ascent: saturating_sum(nets.iter().filter(|n| **n > 0)),
        total_net_descent: saturating_sum(nets.iter().filter(|n| **n < 0)),
        biggest_ascent_day: nets.iter().copied().max().unwrap_or(0),
        biggest_descent_day: nets.iter().copied().min().unwrap_or(0),
        days_in_bed,
        days_on_ground: total_days - days_in_bed,
        total_showers,
        days_since_last_zero: distances.iter().rev().take_while(|d| !is_zero_day(**d)).count(),
        days_since_last_shower: sorted.iter().rev().take_while(|e| !e.took_shower).count(),
        max_days_without_shower: longest_run_without_shower(&sorted),
        current_mile_marker: sorted.last().map_or(0.0, |e| e.end_mile()),
        first_day: sorted.first().map(|e| e.date),
        last_day: sorted.last().map(|e| e.date),
    }
}

fn saturating_sum<'a>(values: impl Iterator<Item = &'a i64>) -> i64 {
    values.fold(0, |acc, n| acc.saturating_add(*n))
}

#[allow(clippy::float_cmp)]
fn is_zero_day(distance: f64) -> bool {
    distance == 0.0
}

fn longest_run_without_shower(sorted: &[&JournalEntry]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for entry in sorted {
        if entry.took_shower {
            longest = longest.max(current);
            current = 0;
        } else {
            current += 1;
        }
    }
    longest.max(current)
}

impl TripStats {
    /// Whether any entries contributed to these stats.
    pub const fn is_empty(&self) -> bool {
        self.total_days == 0
    }

    /// Renders the stats with one decimal place for distances and a
    /// leading `+` on non-negative ascent figures.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            total_days: self.total_days.to_string(),
            total_distance: format_miles(self.total_distance),
            total_zeros: self.total_zeros.to_string(),
            avg_miles_per_day: format_miles(self.avg_miles_per_day),
            avg_miles_no_zeros: format_miles(self.avg_miles_no_zeros),
            avg_miles_per_week: format_miles(self.avg_miles_per_week),
            highest_mileage_day: format_miles(self.highest_mileage_day),
            total_net_ascent: format_ascent(self.total_net_ascent),
            total_net_descent: self.total_net_descent.to_string(),
            biggest_ascent_day: format_ascent(self.biggest_ascent_day),
            biggest_descent_day: self.biggest_descent_day.to_string(),
            days_in_bed: self.days_in_bed.to_string(),
            days_on_ground: self.days_on_ground.to_string(),
            total_showers: self.total_showers.to_string(),
            days_since_last_zero: self.days_since_last_zero.to_string(),
            days_since_last_shower: self.days_since_last_shower.to_string(),
            max_days_without_shower: self.max_days_without_shower.to_string(),
            current_mile_marker: format_miles(self.current_mile_marker),
        }
    }
}

/// Formats a distance with one decimal place.
pub fn format_miles(value: f64) -> String {
    format!("{value:.1}")
}

/// Formats an ascent with an explicit sign.
pub fn format_ascent(value: i64) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::entry::day_start;
    use crate::types::JournalId;

    fn day(n: i64) -> DateTime<Utc> {
        day_start(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()) + Duration::days(n)
    }

    fn entry(n: i64, distance: &str, shower: bool) -> JournalEntry {
        let mut entry = JournalEntry::new(JournalId::new("journal-1").unwrap(), day(n));
        entry.distance_hiked = distance.to_string();
        entry.took_shower = shower;
        entry
    }

    fn with_net(mut entry: JournalEntry, net: &str) -> JournalEntry {
        entry.net_elevation_change = net.to_string();
        entry
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_journal_yields_zeroed_report() {
        let stats = calculate_stats(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats, TripStats::default());

        let report = stats.report();
        assert_eq!(report.avg_miles_per_day, "0.0");
        assert_eq!(report.highest_mileage_day, "0.0");
        assert_eq!(report.total_net_ascent, "+0");
        assert_eq!(report.total_net_descent, "0");
        assert_eq!(report.max_days_without_shower, "0");
    }

    #[test]
    fn zero_and_shower_streaks() {
        let entries = vec![
            entry(0, "0", false),
            entry(1, "5", true),
            entry(2, "0", false),
        ];
        let stats = calculate_stats(&entries);

        assert_eq!(stats.total_zeros, 2);
        assert_eq!(stats.days_since_last_zero, 0);
        assert_eq!(stats.total_showers, 1);
        assert_eq!(stats.max_days_without_shower, 1);
        assert_eq!(stats.days_since_last_shower, 1);
    }

    #[test]
    fn distance_averages() {
        let entries = vec![
            entry(0, "10", false),
            entry(1, "0", false),
            entry(2, "14.6", false),
            entry(3, "not a number", false),
        ];
        let stats = calculate_stats(&entries);

        assert!(close(stats.total_distance, 24.6));
        assert!(close(stats.avg_miles_per_day, 24.6 / 4.0));
        assert!(close(stats.avg_miles_no_zeros, 24.6 / 2.0));
        assert!(close(stats.highest_mileage_day, 14.6));
        assert_eq!(stats.total_zeros, 2);
        assert_eq!(stats.report().avg_miles_no_zeros, "12.3");
    }

    #[test]
    fn all_zero_days_do_not_divide_by_zero() {
        let entries = vec![entry(0, "0", false), entry(1, "", false)];
        let stats = calculate_stats(&entries);

        assert!(close(stats.avg_miles_no_zeros, 0.0));
        assert!(close(stats.avg_miles_per_day, 0.0));
        assert_eq!(stats.days_since_last_zero, 0);
    }

    #[test]
    fn weekly_average_below_one_week_is_unscaled_total() {
        let entries: Vec<_> = (0..6).map(|n| entry(n, "10", false)).collect();
        let stats = calculate_stats(&entries);
        assert!(close(stats.avg_miles_per_week, 60.0));
    }

    #[test]
    fn weekly_average_normalizes_full_weeks() {
        let entries: Vec<_> = (0..14).map(|n| entry(n, "10", false)).collect();
        let stats = calculate_stats(&entries);
        assert!(close(stats.avg_miles_per_week, 70.0));
    }

    #[test]
    fn elevation_aggregates() {
        let entries = vec![
            with_net(entry(0, "10", false), "+1,200"),
            with_net(entry(1, "10", false), "-800"),
            with_net(entry(2, "10", false), "300 ft"),
            with_net(entry(3, "10", false), "-1500"),
            with_net(entry(4, "10", false), "???"),
        ];
        let stats = calculate_stats(&entries);

        assert_eq!(stats.total_net_ascent, 1500);
        assert_eq!(stats.total_net_descent, -2300);
        assert_eq!(stats.biggest_ascent_day, 1200);
        assert_eq!(stats.biggest_descent_day, -1500);

        let report = stats.report();
        assert_eq!(report.total_net_ascent, "+1500");
        assert_eq!(report.total_net_descent, "-2300");
        assert_eq!(report.biggest_ascent_day, "+1200");
        assert_eq!(report.biggest_descent_day, "-1500");
    }

    #[test]
    fn huge_elevations_saturate() {
        let entries = vec![
            with_net(entry(0, "10", false), "9000000000000000000"),
            with_net(entry(1, "10", false), "9000000000000000000"),
            with_net(entry(2, "10", false), "-9000000000000000000"),
            with_net(entry(3, "10", false), "-9000000000000000000"),
        ];
        let stats = calculate_stats(&entries);

        assert_eq!(stats.total_net_ascent, i64::MAX);
        assert_eq!(stats.total_net_descent, i64::MIN);
        assert_eq!(stats.biggest_ascent_day, 9_000_000_000_000_000_000);
    }

    #[test]
    fn overflowing_distance_total_reads_as_zero() {
        let entries = vec![entry(0, "1e308", false), entry(1, "1e308", false)];
        let stats = calculate_stats(&entries);

        assert!(close(stats.total_distance, 0.0));
        assert!(close(stats.avg_miles_per_day, 0.0));
        assert!(close(stats.highest_mileage_day, 1e308));
        let report = stats.report();
        assert_eq!(report.total_distance, "0.0");
        assert_eq!(report.avg_miles_no_zeros, "0.0");
        assert_eq!(report.avg_miles_per_week, "0.0");
    }

    #[test]
    fn amenity_counts() {
        let mut town = entry(1, "3", true);
        town.slept_in_bed = true;
        let entries = vec![entry(0, "12", false), town, entry(2, "15", false)];
        let stats = calculate_stats(&entries);

        assert_eq!(stats.days_in_bed, 1);
        assert_eq!(stats.days_on_ground, 2);
        assert_eq!(stats.total_showers, 1);
    }

    #[test]
    fn trailing_gap_counts_toward_max_without_shower() {
        let entries = vec![
            entry(0, "10", false),
            entry(1, "10", true),
            entry(2, "10", false),
            entry(3, "10", false),
            entry(4, "10", false),
        ];
        let stats = calculate_stats(&entries);
        assert_eq!(stats.max_days_without_shower, 3);
        assert_eq!(stats.days_since_last_shower, 3);
        assert_eq!(stats.days_since_last_zero, 5);
    }

    #[test]
    fn entries_are_sorted_before_streaks() {
        let mut latest = entry(5, "12", false);
        latest.end_mile_marker = "88.1".to_string();
        let entries = vec![latest, entry(0, "0", true), entry(3, "9", false)];
        let stats = calculate_stats(&entries);

        assert_eq!(stats.days_since_last_zero, 2);
        assert_eq!(stats.days_since_last_shower, 2);
        assert!(close(stats.current_mile_marker, 88.1));
        assert_eq!(stats.first_day, Some(day(0)));
        assert_eq!(stats.last_day, Some(day(5)));
    }

    #[test]
    fn invariants_hold_over_mixed_journal() {
        let pattern = ["0", "8", "13.2", "0", "21", "bad", "17.9", "4"];
        let entries: Vec<_> = pattern
            .iter()
            .enumerate()
            .map(|(i, d)| entry(i64::try_from(i).unwrap(), d, i % 3 == 0))
            .collect();
        let stats = calculate_stats(&entries);

        let sum: f64 = entries.iter().map(JournalEntry::distance).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = entries.len() as f64;
        assert!(close(stats.avg_miles_per_day, sum / count));

        #[allow(clippy::cast_precision_loss)]
        let hiking_days = (stats.total_days - stats.total_zeros) as f64;
        assert!(close(stats.avg_miles_no_zeros * hiking_days, stats.total_distance));
        assert!(stats.max_days_without_shower >= stats.days_since_last_shower);
    }

    #[test]
    fn calculation_is_idempotent() {
        let entries = vec![entry(0, "7", false), entry(1, "0", true), entry(2, "11", false)];
        assert_eq!(calculate_stats(&entries), calculate_stats(&entries));
    }

    #[test]
    fn ascent_formatting() {
        assert_eq!(format_ascent(0), "+0");
        assert_eq!(format_ascent(250), "+250");
        assert_eq!(format_ascent(-40), "-40");
        assert_eq!(format_miles(12.44), "12.4");
    }
}
