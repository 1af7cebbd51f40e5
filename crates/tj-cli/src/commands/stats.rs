//! Stats command for showing trip statistics.
//!
//! This module implements `tj stats`, rendering the derived distance, elevation
//! and amenity figures for one journal (human-readable or JSON).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use tj_core::{Journal, StatsReport, TripStats, calculate_stats};
use tj_db::Database;

/// JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonStats<'a> {
    pub journal: &'a str,
    pub stats: &'a TripStats,
    pub formatted: StatsReport,
}

fn section(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

fn line(output: &mut String, label: &str, value: &str) {
    writeln!(output, "{label:<26}{value}").unwrap();
}

/// Format stats for human-readable output.
pub fn format_stats(journal: &Journal, stats: &TripStats) -> String {
    let mut output = String::new();

    writeln!(output, "TRIP STATS: {}", journal.name).unwrap();

    let (Some(first), Some(last)) = (stats.first_day, stats.last_day) else {
        writeln!(output).unwrap();
        writeln!(output, "No entries recorded yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tj entry add' to record a day.").unwrap();
        return output;
    };

    let report = stats.report();
    let day_word = if stats.total_days == 1 { "day" } else { "days" };
    writeln!(
        output,
        "{} to {} ({} {day_word}, mile {})",
        first.format("%b %-d, %Y"),
        last.format("%b %-d, %Y"),
        report.total_days,
        report.current_mile_marker,
    )
    .unwrap();

    section(&mut output, "DISTANCE");
    line(&mut output, "Total", &report.total_distance);
    line(&mut output, "Per day", &report.avg_miles_per_day);
    line(&mut output, "Per hiking day", &report.avg_miles_no_zeros);
    line(&mut output, "Per week", &report.avg_miles_per_week);
    line(&mut output, "Longest day", &report.highest_mileage_day);
    line(&mut output, "Zero days", &report.total_zeros);
    line(&mut output, "Days since last zero", &report.days_since_last_zero);

    section(&mut output, "ELEVATION");
    line(&mut output, "Total net ascent", &report.total_net_ascent);
    line(&mut output, "Total net descent", &report.total_net_descent);
    line(&mut output, "Biggest climb", &report.biggest_ascent_day);
    line(&mut output, "Biggest drop", &report.biggest_descent_day);

    section(&mut output, "AMENITIES");
    line(&mut output, "Nights in a bed", &report.days_in_bed);
    line(&mut output, "Nights on the ground", &report.days_on_ground);
    line(&mut output, "Showers", &report.total_showers);
    line(&mut output, "Days since last shower", &report.days_since_last_shower);
    line(&mut output, "Longest without shower", &report.max_days_without_shower);

    output
}

/// Format stats as JSON.
pub fn format_stats_json(journal: &Journal, stats: &TripStats) -> Result<String> {
    let json = JsonStats {
        journal: &journal.name,
        stats,
        formatted: stats.report(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the stats command.
pub fn run<W: Write>(writer: &mut W, db: &Database, journal: &Journal, json: bool) -> Result<()> {
    let entries = db.list_entries(&journal.id)?;
    tracing::debug!(journal = %journal.id, entries = entries.len(), "computing stats");
    let stats = calculate_stats(&entries);

    if json {
        writeln!(writer, "{}", format_stats_json(journal, &stats)?)?;
    } else {
        write!(writer, "{}", format_stats(journal, &stats))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use insta::assert_snapshot;
    use tj_core::JournalEntry;
    use tj_core::entry::day_start;

    use super::*;

    fn journal() -> Journal {
        Journal::new("Appalachian Trail")
    }

    fn entry(journal: &Journal, day: i64, distance: &str, end: &str, net: &str) -> JournalEntry {
        let start = day_start(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        let mut entry = JournalEntry::new(journal.id.clone(), start + Duration::days(day));
        entry.distance_hiked = distance.to_string();
        entry.end_mile_marker = end.to_string();
        entry.net_elevation_change = net.to_string();
        entry
    }

    #[test]
    fn stats_empty_journal() {
        let journal = journal();
        let output = format_stats(&journal, &calculate_stats(&[]));
        assert_snapshot!(output, @r"
        TRIP STATS: Appalachian Trail

        No entries recorded yet.

        Hint: Run 'tj entry add' to record a day.
        ");
    }

    #[test]
    fn stats_three_days() {
        let journal = journal();
        let mut town = entry(&journal, 1, "0", "8.2", "0");
        town.slept_in_bed = true;
        town.took_shower = true;
        let entries = vec![
            entry(&journal, 0, "8.2", "8.2", "+1,480"),
            town,
            entry(&journal, 2, "12.2", "20.4", "-920"),
        ];

        let output = format_stats(&journal, &calculate_stats(&entries));
        assert_snapshot!(output, @r"
        TRIP STATS: Appalachian Trail
        Mar 15, 2026 to Mar 17, 2026 (3 days, mile 20.4)

        DISTANCE
        ────────
        Total                     20.4
        Per day                   6.8
        Per hiking day            10.2
        Per week                  20.4
        Longest day               12.2
        Zero days                 1
        Days since last zero      1

        ELEVATION
        ─────────
        Total net ascent          +1480
        Total net descent         -920
        Biggest climb             +1480
        Biggest drop              -920

        AMENITIES
        ─────────
        Nights in a bed           1
        Nights on the ground      2
        Showers                   1
        Days since last shower    1
        Longest without shower    1
        ");
    }

    #[test]
    fn stats_json_includes_raw_and_formatted() {
        let journal = journal();
        let entries = vec![entry(&journal, 0, "9.96", "9.96", "")];
        let json = format_stats_json(&journal, &calculate_stats(&entries)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["journal"], "Appalachian Trail");
        assert_eq!(value["stats"]["total_days"], 1);
        assert_eq!(value["formatted"]["total_distance"], "10.0");
        assert_eq!(value["formatted"]["total_net_ascent"], "+0");
    }
}
