//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Journal used when `--journal` is not given, by ID or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_journal: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tj.db"),
            default_journal: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_path).extract()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TJ_*)
        figment.merge(Env::prefixed("TJ_"))
    }
}

/// Returns the platform-specific config directory for tj.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tj"))
}

/// Returns the platform-specific data directory for tj.
///
/// On Linux: `~/.local/share/tj`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tj"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_tj() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tj");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("tj.db"));
        assert!(config.default_journal.is_none());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                database_path = "/tmp/trail.db"
                default_journal = "PCT 2026"
                "#,
            )?;
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/trail.db"));
            assert_eq!(config.default_journal.as_deref(), Some("PCT 2026"));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", r#"database_path = "/tmp/file.db""#)?;
            jail.set_env("TJ_DATABASE_PATH", "/tmp/env.db");
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));
            Ok(())
        });
    }
}
