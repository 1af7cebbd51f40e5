//! CLI subcommand implementations.

pub mod entry;
pub mod forecast;
pub mod journal;
pub mod stats;
pub mod summary;
pub mod util;
pub mod waypoint;
