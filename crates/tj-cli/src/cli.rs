//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Trail journal.
///
/// Records daily hiking entries and derives trip statistics and waypoint
/// arrival forecasts.
#[derive(Debug, Parser)]
#[command(name = "tj", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Journal to operate on, by ID or name. Defaults to `default_journal`.
    #[arg(short, long, global = true)]
    pub journal: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create, list and delete journals.
    #[command(subcommand)]
    Journal(JournalAction),

    /// Record and manage daily entries.
    #[command(subcommand)]
    Entry(EntryAction),

    /// Manage forecast waypoints.
    #[command(subcommand)]
    Waypoint(WaypointAction),

    /// Show trip statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show estimated arrival dates for waypoints.
    Forecast {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show statistics and forecasts together.
    Summary,
}

/// Journal management actions.
#[derive(Debug, Subcommand)]
pub enum JournalAction {
    /// Create a new journal.
    New {
        /// Journal name (must be unique).
        name: String,
    },
    /// List all journals.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete a journal with all its entries and waypoints.
    Delete {
        /// Journal ID or name.
        #[arg(value_name = "JOURNAL")]
        target: String,
    },
}

/// Entry management actions.
#[derive(Debug, Subcommand)]
pub enum EntryAction {
    /// Add an entry to the selected journal.
    Add(EntryFields),
    /// Change fields of an existing entry.
    Edit {
        /// Entry ID.
        id: String,
        #[command(flatten)]
        fields: EntryFields,
    },
    /// Delete an entry.
    Delete {
        /// Entry ID.
        id: String,
    },
    /// List the selected journal's entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Entry fields. Omitted fields are left unchanged (or empty on add).
#[derive(Debug, Default, Clone, Args)]
pub struct EntryFields {
    /// Day of the entry: YYYY-MM-DD, today, yesterday, or "N days ago".
    #[arg(long)]
    pub date: Option<String>,

    /// Distance hiked.
    #[arg(long)]
    pub distance: Option<String>,

    /// Mile marker at the start of the day.
    #[arg(long)]
    pub start_mile: Option<String>,

    /// Mile marker at the end of the day.
    #[arg(long)]
    pub end_mile: Option<String>,

    /// Elevation at the start of the day.
    #[arg(long)]
    pub elevation_start: Option<String>,

    /// Elevation at the end of the day.
    #[arg(long)]
    pub elevation_end: Option<String>,

    /// Net elevation change. Derived from start/end elevation when omitted.
    #[arg(long, allow_hyphen_values = true)]
    pub net_elevation: Option<String>,

    /// Slept in a bed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub bed: Option<bool>,

    /// Took a shower.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub shower: Option<bool>,

    /// Where the day started.
    #[arg(long)]
    pub from: Option<String>,

    /// Where the day ended.
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub weather: Option<String>,

    /// Trail conditions.
    #[arg(long)]
    pub conditions: Option<String>,

    /// Wildlife sightings.
    #[arg(long)]
    pub wildlife: Option<String>,

    /// Resupply notes.
    #[arg(long)]
    pub resupply: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Day rating from 1 to 5.
    #[arg(long)]
    pub rating: Option<i64>,
}

/// Waypoint management actions.
#[derive(Debug, Subcommand)]
pub enum WaypointAction {
    /// Add a waypoint to the selected journal.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Distance along the trail.
        #[arg(long)]
        mile: f64,
    },
    /// Rename or move a waypoint.
    Edit {
        /// Waypoint ID.
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        mile: Option<f64>,
    },
    /// Delete a waypoint.
    Delete {
        /// Waypoint ID.
        id: String,
    },
    /// List the selected journal's waypoints.
    List,
}
