//! Entry commands: add, edit, delete and list daily entries.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use tj_core::entry::day_start;
use tj_core::{EntryId, Journal, JournalEntry, Rating};
use tj_db::Database;

use super::util::{parse_date_from, short_id, truncate};
use crate::cli::EntryFields;

/// Copies every provided field onto `entry`.
///
/// When elevations are given without an explicit net change, the net change is
/// recomputed from them.
pub fn apply_fields(entry: &mut JournalEntry, fields: &EntryFields, today: NaiveDate) -> Result<()> {
    if let Some(date) = &fields.date {
        entry.date = day_start(parse_date_from(date, today)?);
    }
    if let Some(rating) = fields.rating {
        entry.rating = Some(Rating::new(rating)?);
    }

    let text_fields = [
        (&fields.distance, &mut entry.distance_hiked),
        (&fields.start_mile, &mut entry.start_mile_marker),
        (&fields.end_mile, &mut entry.end_mile_marker),
        (&fields.elevation_start, &mut entry.elevation_start),
        (&fields.elevation_end, &mut entry.elevation_end),
        (&fields.net_elevation, &mut entry.net_elevation_change),
        (&fields.from, &mut entry.start_location),
        (&fields.to, &mut entry.end_location),
        (&fields.weather, &mut entry.weather),
        (&fields.conditions, &mut entry.trail_conditions),
        (&fields.wildlife, &mut entry.wildlife),
        (&fields.resupply, &mut entry.resupply),
        (&fields.notes, &mut entry.notes),
    ];
    for (value, target) in text_fields {
        if let Some(value) = value {
            target.clone_from(value);
        }
    }

    if let Some(bed) = fields.bed {
        entry.slept_in_bed = bed;
    }
    if let Some(shower) = fields.shower {
        entry.took_shower = shower;
    }

    let elevation_given = fields.elevation_start.is_some() || fields.elevation_end.is_some();
    if fields.net_elevation.is_none() && elevation_given {
        let previous = std::mem::take(&mut entry.net_elevation_change);
        if !entry.fill_net_elevation() {
            entry.net_elevation_change = previous;
        }
    }
    Ok(())
}

/// Adds an entry to `journal` and prints its ID. The date defaults to today.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    journal: &Journal,
    fields: &EntryFields,
    today: NaiveDate,
) -> Result<()> {
    let mut entry = JournalEntry::new(journal.id.clone(), day_start(today));
    apply_fields(&mut entry, fields, today)?;
    db.insert_entry(&entry).context("failed to add entry")?;
    tracing::debug!(entry = %entry.id, date = %entry.date.date_naive(), "entry added");
    writeln!(writer, "{}", entry.id)?;
    Ok(())
}

/// Edits an existing entry in place.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    fields: &EntryFields,
    today: NaiveDate,
) -> Result<()> {
    let id = EntryId::new(id)?;
    let mut entry = db.get_entry(&id)?;
    apply_fields(&mut entry, fields, today)?;
    db.update_entry(&entry).context("failed to update entry")?;
    writeln!(writer, "Updated entry for {}.", entry.date.format("%Y-%m-%d"))?;
    Ok(())
}

/// Deletes an entry by ID.
pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = EntryId::new(id)?;
    db.delete_entry(&id)?;
    writeln!(writer, "Deleted entry {id}.")?;
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "-" }
}

/// Format entries for human-readable output.
pub fn format_entries(journal: &Journal, entries: &[JournalEntry]) -> String {
    let mut output = String::new();

    writeln!(output, "ENTRIES: {}", journal.name).unwrap();
    writeln!(output).unwrap();

    if entries.is_empty() {
        writeln!(output, "No entries yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'tj entry add --distance <miles>' to record today."
        )
        .unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10}  {:<8}  {:>8}  {:>8}  {:>8}  {:>7}  {:<3}  {:<6}  Notes",
        "Date", "ID", "Distance", "Start", "End", "Net", "Bed", "Shower"
    )
    .unwrap();
    writeln!(
        output,
        "──────────  ────────  ────────  ────────  ────────  ───────  ───  ──────  ────────────────────"
    )
    .unwrap();

    for entry in entries {
        writeln!(
            output,
            "{:<10}  {:<8}  {:>8}  {:>8}  {:>8}  {:>7}  {:<3}  {:<6}  {}",
            entry.date.format("%Y-%m-%d"),
            short_id(entry.id.as_str()),
            truncate(&entry.distance_hiked, 8),
            truncate(&entry.start_mile_marker, 8),
            truncate(&entry.end_mile_marker, 8),
            truncate(&entry.net_elevation_change, 7),
            yes_no(entry.slept_in_bed),
            yes_no(entry.took_shower),
            truncate(&entry.notes, 40),
        )
        .unwrap();
    }

    output
}

/// Runs the entry list command.
pub fn list<W: Write>(writer: &mut W, db: &Database, journal: &Journal, json: bool) -> Result<()> {
    let entries = db.list_entries(&journal.id)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_entries(journal, &entries))?;
    }
    Ok(())
}
