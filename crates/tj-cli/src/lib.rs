//! Trail journal CLI library.
//!
//! This crate provides the `tj` command-line interface.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EntryAction, EntryFields, JournalAction, WaypointAction};
pub use config::Config;
