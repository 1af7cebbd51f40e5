//! Summary command: stats and forecasts rendered from one journal view.

use std::io::Write;

use anyhow::Result;

use tj_core::{Journal, JournalView};
use tj_db::Database;

use super::{forecast, stats};

/// Runs the summary command.
///
/// The view is fed through a storage subscription, the same path a long-lived
/// front end would use to stay current.
pub fn run<W: Write>(writer: &mut W, db: &mut Database, journal: &Journal) -> Result<()> {
    let receiver = db.subscribe(&journal.id)?;
    let mut view = JournalView::new();
    let applied = view.drain(&receiver);
    tracing::debug!(journal = %journal.id, applied, revision = ?view.revision(), "summary view ready");

    write!(writer, "{}", stats::format_stats(journal, view.stats()))?;
    writeln!(writer)?;
    write!(
        writer,
        "{}",
        forecast::format_forecasts(journal, view.stats(), view.forecasts())
    )?;
    Ok(())
}
