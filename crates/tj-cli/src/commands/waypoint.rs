//! Waypoint commands: add, edit, delete and list forecast targets.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};

use tj_core::stats::format_miles;
use tj_core::types::{validate_mile_marker, validate_name};
use tj_core::{Journal, Waypoint, WaypointId};
use tj_db::Database;

use super::util::short_id;

/// Adds a waypoint to `journal` and prints its ID.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    journal: &Journal,
    name: &str,
    mile: f64,
) -> Result<()> {
    let waypoint = Waypoint::new(
        journal.id.clone(),
        validate_name(name, "waypoint name")?,
        validate_mile_marker(mile)?,
    );
    db.insert_waypoint(&waypoint)
        .context("failed to add waypoint")?;
    writeln!(writer, "{}", waypoint.id)?;
    Ok(())
}

/// Renames or moves a waypoint of `journal`.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    journal: &Journal,
    id: &str,
    name: Option<&str>,
    mile: Option<f64>,
) -> Result<()> {
    let id = WaypointId::new(id)?;
    let mut waypoint = db
        .list_waypoints(&journal.id)?
        .into_iter()
        .find(|w| w.id == id)
        .with_context(|| format!("No waypoint {id} in journal '{}'.", journal.name))?;

    if let Some(name) = name {
        waypoint.name = validate_name(name, "waypoint name")?;
    }
    if let Some(mile) = mile {
        waypoint.mile_marker = validate_mile_marker(mile)?;
    }

    db.update_waypoint(&waypoint)
        .context("failed to update waypoint")?;
    writeln!(
        writer,
        "Updated waypoint '{}' at mile {}.",
        waypoint.name,
        format_miles(waypoint.mile_marker)
    )?;
    Ok(())
}

/// Deletes a waypoint by ID.
pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = WaypointId::new(id)?;
    db.delete_waypoint(&id)?;
    writeln!(writer, "Deleted waypoint {id}.")?;
    Ok(())
}

/// Format waypoints for human-readable output.
pub fn format_waypoints(journal: &Journal, waypoints: &[Waypoint]) -> String {
    let mut output = String::new();

    writeln!(output, "WAYPOINTS: {}", journal.name).unwrap();
    writeln!(output).unwrap();

    if waypoints.is_empty() {
        writeln!(output, "No waypoints yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'tj waypoint add --name <name> --mile <mile>' to add one."
        )
        .unwrap();
        return output;
    }

    writeln!(output, "{:<8}  {:>8}  Name", "ID", "Mile").unwrap();
    writeln!(output, "────────  ────────  ──────────────────────").unwrap();
    for waypoint in waypoints {
        writeln!(
            output,
            "{:<8}  {:>8}  {}",
            short_id(waypoint.id.as_str()),
            format_miles(waypoint.mile_marker),
            waypoint.name
        )
        .unwrap();
    }

    output
}

/// Runs the waypoint list command.
pub fn list<W: Write>(writer: &mut W, db: &Database, journal: &Journal) -> Result<()> {
    let waypoints = db.list_waypoints(&journal.id)?;
    write!(writer, "{}", format_waypoints(journal, &waypoints))?;
    Ok(())
}
