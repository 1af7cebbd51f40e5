//! Forecast command for showing waypoint arrival estimates.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use tj_core::stats::format_miles;
use tj_core::{Journal, TripStats, WaypointForecast, calculate_stats, forecast_arrivals_at};
use tj_db::Database;

use super::util::truncate;

/// One waypoint in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonForecast {
    pub id: String,
    pub name: String,
    pub mile_marker: f64,
    pub estimated_days_to_arrival: Option<i64>,
    pub estimated_arrival_date: Option<String>,
}

/// JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonForecasts {
    pub journal: String,
    pub current_mile_marker: f64,
    pub pace: f64,
    pub waypoints: Vec<JsonForecast>,
}

/// Format forecasts for human-readable output.
pub fn format_forecasts(
    journal: &Journal,
    stats: &TripStats,
    forecasts: &[WaypointForecast],
) -> String {
    let mut output = String::new();

    writeln!(output, "FORECAST: {}", journal.name).unwrap();
    writeln!(
        output,
        "Mile {}, averaging {} per hiking day",
        format_miles(stats.current_mile_marker),
        format_miles(stats.avg_miles_no_zeros)
    )
    .unwrap();
    writeln!(output).unwrap();

    if forecasts.is_empty() {
        writeln!(output, "No waypoints yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'tj waypoint add --name <name> --mile <mile>' to add one."
        )
        .unwrap();
        return output;
    }

    writeln!(output, "{:<22}  {:>8}  {:>4}  Arrival", "Waypoint", "Mile", "Days").unwrap();
    writeln!(
        output,
        "──────────────────────  ────────  ────  ──────────────────"
    )
    .unwrap();

    for forecast in forecasts {
        let days = forecast
            .estimated_days_to_arrival()
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        let arrival = forecast
            .estimated_arrival_date()
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(
            output,
            "{:<22}  {:>8}  {:>4}  {}",
            truncate(&forecast.waypoint.name, 22),
            format_miles(forecast.waypoint.mile_marker),
            days,
            arrival
        )
        .unwrap();
    }

    output
}

/// Format forecasts as JSON.
pub fn format_forecasts_json(
    journal: &Journal,
    stats: &TripStats,
    forecasts: &[WaypointForecast],
) -> Result<String> {
    let json = JsonForecasts {
        journal: journal.name.clone(),
        current_mile_marker: stats.current_mile_marker,
        pace: stats.avg_miles_no_zeros,
        waypoints: forecasts
            .iter()
            .map(|f| JsonForecast {
                id: f.waypoint.id.to_string(),
                name: f.waypoint.name.clone(),
                mile_marker: f.waypoint.mile_marker,
                estimated_days_to_arrival: f.estimated_days_to_arrival(),
                estimated_arrival_date: f.estimated_arrival_date(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the forecast command against the local clock.
pub fn run<W: Write>(writer: &mut W, db: &Database, journal: &Journal, json: bool) -> Result<()> {
    run_at(writer, db, journal, json, Local::now())
}

/// Runs the forecast command relative to `now`.
pub fn run_at<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    journal: &Journal,
    json: bool,
    now: DateTime<Tz>,
) -> Result<()> {
    let entries = db.list_entries(&journal.id)?;
    let waypoints = db.list_waypoints(&journal.id)?;
    tracing::debug!(
        journal = %journal.id,
        entries = entries.len(),
        waypoints = waypoints.len(),
        "computing forecast"
    );

    let stats = calculate_stats(&entries);
    let forecasts = forecast_arrivals_at(&entries, &waypoints, now);

    if json {
        writeln!(writer, "{}", format_forecasts_json(journal, &stats, &forecasts)?)?;
    } else {
        write!(writer, "{}", format_forecasts(journal, &stats, &forecasts))?;
    }
    Ok(())
}
