//! Storage layer for the trail journal.
//!
//! Provides persistence for journals, entries and waypoints using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Construct one explicitly and
//! pass it to whatever needs it.
//!
//! # Change Subscriptions
//!
//! [`Database::subscribe`] hands out a channel receiver for one journal. The
//! current snapshot is sent immediately, and a fresh [`JournalSnapshot`] is pushed
//! after every committed write touching that journal. Each write bumps a revision
//! counter so subscribers can discard out-of-order snapshots.
//!
//! # Schema
//!
//! Entry dates are stored as INTEGER milliseconds since the Unix epoch. Distance,
//! mile marker and elevation fields are stored as TEXT exactly as entered; parsing
//! them is the calculators' concern. Journal creation times are TEXT in ISO 8601
//! with fixed nanosecond precision, so lexicographic order is chronological.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use tj_core::entry::from_millis;
use tj_core::{
    EntryId, Journal, JournalEntry, JournalId, JournalSnapshot, Rating, Waypoint, WaypointId,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No journal with the given ID or name.
    #[error("journal not found: {0}")]
    JournalNotFound(String),
    /// A journal with this name already exists.
    #[error("a journal named {0:?} already exists")]
    DuplicateJournal(String),
    /// No entry with the given ID.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
    /// No waypoint with the given ID.
    #[error("waypoint not found: {0}")]
    WaypointNotFound(String),
}

struct Subscriber {
    journal_id: JournalId,
    sender: Sender<JournalSnapshot>,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    revision: u64,
    subscribers: Vec<Subscriber>,
}

const ENTRY_COLUMNS: &str = "
    id, journal_id, date_ms, distance_hiked, start_mile_marker, end_mile_marker,
    elevation_start, elevation_end, net_elevation_change, slept_in_bed, took_shower,
    start_location, end_location, weather, trail_conditions, wildlife, resupply,
    notes, rating
";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn,
            revision: 0,
            subscribers: Vec::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS journals (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Numeric-looking columns are TEXT on purpose: values are kept as typed.
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                journal_id TEXT NOT NULL,
                date_ms INTEGER NOT NULL,
                distance_hiked TEXT NOT NULL DEFAULT '',
                start_mile_marker TEXT NOT NULL DEFAULT '',
                end_mile_marker TEXT NOT NULL DEFAULT '',
                elevation_start TEXT NOT NULL DEFAULT '',
                elevation_end TEXT NOT NULL DEFAULT '',
                net_elevation_change TEXT NOT NULL DEFAULT '',
                slept_in_bed INTEGER NOT NULL DEFAULT 0,
                took_shower INTEGER NOT NULL DEFAULT 0,
                start_location TEXT NOT NULL DEFAULT '',
                end_location TEXT NOT NULL DEFAULT '',
                weather TEXT NOT NULL DEFAULT '',
                trail_conditions TEXT NOT NULL DEFAULT '',
                wildlife TEXT NOT NULL DEFAULT '',
                resupply TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                rating INTEGER,
                FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_entries_journal ON entries(journal_id);
            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date_ms);

            CREATE TABLE IF NOT EXISTS waypoints (
                id TEXT PRIMARY KEY,
                journal_id TEXT NOT NULL,
                name TEXT NOT NULL,
                mile_marker REAL NOT NULL,
                FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_waypoints_journal ON waypoints(journal_id);
            ",
        )?;
        Ok(())
    }

    // ========== Journals ==========

    /// Inserts a new journal. Names must be unique.
    pub fn insert_journal(&mut self, journal: &Journal) -> Result<(), DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM journals WHERE name = ?)",
            [&journal.name],
            |row| row.get(0),
        )?;
        if exists {
            return Err(DbError::DuplicateJournal(journal.name.clone()));
        }
        self.conn.execute(
            "INSERT INTO journals (id, name, created_at) VALUES (?, ?, ?)",
            params![
                journal.id.as_str(),
                journal.name,
                format_timestamp(journal.created_at)
            ],
        )?;
        tracing::debug!(journal = %journal.id, name = %journal.name, "inserted journal");
        self.publish(&journal.id);
        Ok(())
    }

    /// Lists journals ordered by creation time.
    pub fn list_journals(&self) -> Result<Vec<Journal>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM journals ORDER BY created_at ASC, rowid ASC")?;
        let rows = stmt.query_map([], journal_from_row)?;
        let mut journals = Vec::new();
        for row in rows {
            journals.push(row?);
        }
        Ok(journals)
    }

    /// Looks up a journal by exact ID, falling back to exact name.
    pub fn find_journal(&self, key: &str) -> Result<Journal, DbError> {
        self.conn
            .query_row(
                "
                SELECT id, name, created_at FROM journals
                WHERE id = ?1 OR name = ?1
                ORDER BY id = ?1 DESC
                LIMIT 1
                ",
                [key],
                journal_from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::JournalNotFound(key.to_string()))
    }

    /// Deletes a journal along with its entries and waypoints.
    pub fn delete_journal(&mut self, id: &JournalId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM journals WHERE id = ?", [id.as_str()])?;
        if deleted == 0 {
            return Err(DbError::JournalNotFound(id.to_string()));
        }
        tracing::debug!(journal = %id, "deleted journal");
        self.publish(id);
        Ok(())
    }

    fn ensure_journal(&self, id: &JournalId) -> Result<(), DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM journals WHERE id = ?)",
            [id.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(DbError::JournalNotFound(id.to_string()))
        }
    }

    // ========== Entries ==========

    /// Inserts an entry into an existing journal.
    pub fn insert_entry(&mut self, entry: &JournalEntry) -> Result<(), DbError> {
        self.ensure_journal(&entry.journal_id)?;
        self.conn.execute(
            &format!(
                "INSERT INTO entries ({ENTRY_COLUMNS})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                entry.id.as_str(),
                entry.journal_id.as_str(),
                entry.date_millis(),
                entry.distance_hiked,
                entry.start_mile_marker,
                entry.end_mile_marker,
                entry.elevation_start,
                entry.elevation_end,
                entry.net_elevation_change,
                entry.slept_in_bed,
                entry.took_shower,
                entry.start_location,
                entry.end_location,
                entry.weather,
                entry.trail_conditions,
                entry.wildlife,
                entry.resupply,
                entry.notes,
                entry.rating.map(i64::from),
            ],
        )?;
        tracing::debug!(entry = %entry.id, journal = %entry.journal_id, "inserted entry");
        self.publish(&entry.journal_id);
        Ok(())
    }

    /// Replaces every field of an existing entry. The owning journal cannot change.
    pub fn update_entry(&mut self, entry: &JournalEntry) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "
            UPDATE entries SET
                date_ms = ?, distance_hiked = ?, start_mile_marker = ?, end_mile_marker = ?,
                elevation_start = ?, elevation_end = ?, net_elevation_change = ?,
                slept_in_bed = ?, took_shower = ?, start_location = ?, end_location = ?,
                weather = ?, trail_conditions = ?, wildlife = ?, resupply = ?, notes = ?,
                rating = ?
            WHERE id = ? AND journal_id = ?
            ",
            params![
                entry.date_millis(),
                entry.distance_hiked,
                entry.start_mile_marker,
                entry.end_mile_marker,
                entry.elevation_start,
                entry.elevation_end,
                entry.net_elevation_change,
                entry.slept_in_bed,
                entry.took_shower,
                entry.start_location,
                entry.end_location,
                entry.weather,
                entry.trail_conditions,
                entry.wildlife,
                entry.resupply,
                entry.notes,
                entry.rating.map(i64::from),
                entry.id.as_str(),
                entry.journal_id.as_str(),
            ],
        )?;
        if updated == 0 {
            return Err(DbError::EntryNotFound(entry.id.to_string()));
        }
        tracing::debug!(entry = %entry.id, "updated entry");
        self.publish(&entry.journal_id);
        Ok(())
    }

    /// Deletes an entry, returning the journal it belonged to.
    pub fn delete_entry(&mut self, id: &EntryId) -> Result<JournalId, DbError> {
        let journal_id: Option<String> = self
            .conn
            .query_row(
                "DELETE FROM entries WHERE id = ? RETURNING journal_id",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(journal_id) = journal_id else {
            return Err(DbError::EntryNotFound(id.to_string()));
        };
        let journal_id = JournalId::new(journal_id)
            .map_err(|e| conversion_error(0, Type::Text, e))?;
        tracing::debug!(entry = %id, journal = %journal_id, "deleted entry");
        self.publish(&journal_id);
        Ok(journal_id)
    }

    /// Fetches a single entry.
    pub fn get_entry(&self, id: &EntryId) -> Result<JournalEntry, DbError> {
        self.conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"),
                [id.as_str()],
                entry_from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::EntryNotFound(id.to_string()))
    }

    /// Lists a journal's entries ordered by date, then insertion order.
    pub fn list_entries(&self, journal_id: &JournalId) -> Result<Vec<JournalEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE journal_id = ? ORDER BY date_ms ASC, rowid ASC"
        ))?;
        let rows = stmt.query_map([journal_id.as_str()], entry_from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    // ========== Waypoints ==========

    /// Inserts a waypoint into an existing journal.
    pub fn insert_waypoint(&mut self, waypoint: &Waypoint) -> Result<(), DbError> {
        self.ensure_journal(&waypoint.journal_id)?;
        self.conn.execute(
            "INSERT INTO waypoints (id, journal_id, name, mile_marker) VALUES (?, ?, ?, ?)",
            params![
                waypoint.id.as_str(),
                waypoint.journal_id.as_str(),
                waypoint.name,
                waypoint.mile_marker,
            ],
        )?;
        tracing::debug!(waypoint = %waypoint.id, journal = %waypoint.journal_id, "inserted waypoint");
        self.publish(&waypoint.journal_id);
        Ok(())
    }

    /// Updates a waypoint's name and mile marker.
    pub fn update_waypoint(&mut self, waypoint: &Waypoint) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE waypoints SET name = ?, mile_marker = ? WHERE id = ? AND journal_id = ?",
            params![
                waypoint.name,
                waypoint.mile_marker,
                waypoint.id.as_str(),
                waypoint.journal_id.as_str(),
            ],
        )?;
        if updated == 0 {
            return Err(DbError::WaypointNotFound(waypoint.id.to_string()));
        }
        tracing::debug!(waypoint = %waypoint.id, "updated waypoint");
        self.publish(&waypoint.journal_id);
        Ok(())
    }

    /// Deletes a waypoint, returning the journal it belonged to.
    pub fn delete_waypoint(&mut self, id: &WaypointId) -> Result<JournalId, DbError> {
        let journal_id: Option<String> = self
            .conn
            .query_row(
                "DELETE FROM waypoints WHERE id = ? RETURNING journal_id",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(journal_id) = journal_id else {
            return Err(DbError::WaypointNotFound(id.to_string()));
        };
        let journal_id = JournalId::new(journal_id)
            .map_err(|e| conversion_error(0, Type::Text, e))?;
        tracing::debug!(waypoint = %id, journal = %journal_id, "deleted waypoint");
        self.publish(&journal_id);
        Ok(journal_id)
    }

    /// Lists a journal's waypoints in the order they were added.
    pub fn list_waypoints(&self, journal_id: &JournalId) -> Result<Vec<Waypoint>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, journal_id, name, mile_marker
            FROM waypoints
            WHERE journal_id = ?
            ORDER BY rowid ASC
            ",
        )?;
        let rows = stmt.query_map([journal_id.as_str()], waypoint_from_row)?;
        let mut waypoints = Vec::new();
        for row in rows {
            waypoints.push(row?);
        }
        Ok(waypoints)
    }

    // ========== Snapshots ==========

    /// Current revision. Increases after every write.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Reads a journal's entries and waypoints at the current revision.
    ///
    /// An unknown or deleted journal yields an empty snapshot.
    pub fn snapshot(&self, journal_id: &JournalId) -> Result<JournalSnapshot, DbError> {
        Ok(JournalSnapshot {
            journal_id: journal_id.clone(),
            revision: self.revision,
            entries: self.list_entries(journal_id)?,
            waypoints: self.list_waypoints(journal_id)?,
        })
    }

    /// Subscribes to changes of one journal.
    ///
    /// The current snapshot is delivered immediately. The subscription ends
    /// when the receiver is dropped.
    pub fn subscribe(&mut self, journal_id: &JournalId) -> Result<Receiver<JournalSnapshot>, DbError> {
        let (sender, receiver) = mpsc::channel();
        let snapshot = self.snapshot(journal_id)?;
        // The receiver is still in scope, so this send cannot fail.
        let _ = sender.send(snapshot);
        self.subscribers.push(Subscriber {
            journal_id: journal_id.clone(),
            sender,
        });
        Ok(receiver)
    }

    /// Bumps the revision and pushes a fresh snapshot to the journal's subscribers.
    ///
    /// The write is already committed, so a failed snapshot read is logged and
    /// subscribers simply miss this revision.
    fn publish(&mut self, journal_id: &JournalId) {
        self.revision += 1;
        if !self.subscribers.iter().any(|s| &s.journal_id == journal_id) {
            return;
        }

        let snapshot = match self.snapshot(journal_id) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    journal = %journal_id,
                    revision = self.revision,
                    error = %err,
                    "failed to read snapshot for subscribers"
                );
                return;
            }
        };
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| {
            subscriber.journal_id != *journal_id || subscriber.sender.send(snapshot.clone()).is_ok()
        });
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            tracing::debug!(journal = %journal_id, dropped, "pruned closed subscriptions");
        }
    }
}

fn journal_from_row(row: &Row<'_>) -> rusqlite::Result<Journal> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(2)?;
    Ok(Journal {
        id: JournalId::new(id).map_err(|e| conversion_error(0, Type::Text, e))?,
        name: row.get(1)?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(2, Type::Text, e))?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let id: String = row.get(0)?;
    let journal_id: String = row.get(1)?;
    let rating: Option<i64> = row.get(18)?;
    Ok(JournalEntry {
        id: EntryId::new(id).map_err(|e| conversion_error(0, Type::Text, e))?,
        journal_id: JournalId::new(journal_id).map_err(|e| conversion_error(1, Type::Text, e))?,
        date: from_millis(row.get(2)?),
        distance_hiked: row.get(3)?,
        start_mile_marker: row.get(4)?,
        end_mile_marker: row.get(5)?,
        elevation_start: row.get(6)?,
        elevation_end: row.get(7)?,
        net_elevation_change: row.get(8)?,
        slept_in_bed: row.get(9)?,
        took_shower: row.get(10)?,
        start_location: row.get(11)?,
        end_location: row.get(12)?,
        weather: row.get(13)?,
        trail_conditions: row.get(14)?,
        wildlife: row.get(15)?,
        resupply: row.get(16)?,
        notes: row.get(17)?,
        rating: rating
            .map(Rating::new)
            .transpose()
            .map_err(|e| conversion_error(18, Type::Integer, e))?,
    })
}

fn waypoint_from_row(row: &Row<'_>) -> rusqlite::Result<Waypoint> {
    let id: String = row.get(0)?;
    let journal_id: String = row.get(1)?;
    Ok(Waypoint {
        id: WaypointId::new(id).map_err(|e| conversion_error(0, Type::Text, e))?,
        journal_id: JournalId::new(journal_id).map_err(|e| conversion_error(1, Type::Text, e))?,
        name: row.get(2)?,
        mile_marker: row.get(3)?,
    })
}

fn conversion_error<E>(column: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(timestamp).map(|parsed| parsed.with_timezone(&Utc))
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
