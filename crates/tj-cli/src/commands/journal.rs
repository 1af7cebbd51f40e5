//! Journal commands: create, list and delete trips.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use tj_core::Journal;
use tj_core::types::validate_name;
use tj_db::Database;

use super::util::{resolve_journal, short_id};

/// Journal row for listings.
#[derive(Debug, Clone, Serialize)]
pub struct JournalRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub entries: usize,
    pub waypoints: usize,
}

/// Creates a journal and prints its ID.
pub fn create<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<()> {
    let name = validate_name(name, "journal name")?;
    let journal = Journal::new(name);
    db.insert_journal(&journal)
        .context("failed to create journal")?;
    writeln!(writer, "{}", journal.id)?;
    Ok(())
}

/// Collects journals with their entry and waypoint counts.
pub fn get_journal_rows(db: &Database) -> Result<Vec<JournalRow>> {
    db.list_journals()?
        .into_iter()
        .map(|journal| {
            Ok(JournalRow {
                entries: db.list_entries(&journal.id)?.len(),
                waypoints: db.list_waypoints(&journal.id)?.len(),
                created_at: journal.created_at.format("%Y-%m-%d").to_string(),
                id: journal.id.into(),
                name: journal.name,
            })
        })
        .collect()
}

/// Format journals for human-readable output.
pub fn format_journals(rows: &[JournalRow]) -> String {
    let mut output = String::new();

    writeln!(output, "JOURNALS").unwrap();
    writeln!(output).unwrap();

    if rows.is_empty() {
        writeln!(output, "No journals yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tj journal new <name>' to start one.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<8}  {:<10}  {:>7}  {:>9}  Name",
        "ID", "Created", "Entries", "Waypoints"
    )
    .unwrap();
    writeln!(
        output,
        "────────  ──────────  ───────  ─────────  ──────────────────────"
    )
    .unwrap();

    for row in rows {
        writeln!(
            output,
            "{:<8}  {:<10}  {:>7}  {:>9}  {}",
            short_id(&row.id),
            row.created_at,
            row.entries,
            row.waypoints,
            row.name
        )
        .unwrap();
    }

    output
}

/// Runs the journal list command.
pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let rows = get_journal_rows(db)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(writer, "{}", format_journals(&rows))?;
    }
    Ok(())
}

/// Deletes a journal by ID or name.
pub fn delete<W: Write>(writer: &mut W, db: &mut Database, target: &str) -> Result<()> {
    let journal = resolve_journal(db, Some(target), None)?;
    db.delete_journal(&journal.id)
        .context("failed to delete journal")?;
    writeln!(writer, "Deleted journal '{}'.", journal.name)?;
    Ok(())
}
