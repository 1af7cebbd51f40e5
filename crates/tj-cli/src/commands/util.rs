//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use regex::Regex;

use tj_core::Journal;
use tj_db::{Database, DbError};

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative day parsing (~1000 years).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// Parse an entry date as either `YYYY-MM-DD` or a day relative to `today`.
///
/// Supports:
/// - ISO dates: "2026-04-12"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_date_from(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2026-04-12), 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date too far back: {n} {}", &caps[2]);
    }

    today
        .checked_sub_signed(Duration::days(n * days_per_unit))
        .with_context(|| format!("date out of range: {s}"))
}

/// Resolve which journal a command applies to.
///
/// Uses `--journal` first, then the configured default. With neither, a database
/// holding exactly one journal uses that one.
pub fn resolve_journal(
    db: &Database,
    requested: Option<&str>,
    default_journal: Option<&str>,
) -> Result<Journal> {
    if let Some(key) = requested.or(default_journal) {
        return db.find_journal(key).map_err(|err| match err {
            DbError::JournalNotFound(_) => anyhow::anyhow!(
                "No journal matches '{key}'. Run 'tj journal list' to see journals."
            ),
            other => other.into(),
        });
    }

    let mut journals = db.list_journals()?;
    match journals.len() {
        0 => anyhow::bail!("No journals yet. Create one with 'tj journal new <name>'."),
        1 => Ok(journals.remove(0)),
        _ => anyhow::bail!(
            "Several journals exist. Pass --journal <id|name> or set default_journal in the config."
        ),
    }
}

/// First characters of an ID, for table display.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width.saturating_sub(3)).collect::<String>())
    } else {
        text.to_string()
    }
}
