mod file_config;

pub use file_config::{FileConfig, WikipediaConfig};

use crate::server::RequestsLoggingLevel;
use crate::wikipedia::DEFAULT_THUMBNAIL_SIZE;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub disable_wikipedia: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub wikipedia: WikipediaSettings,
}

#[derive(Debug, Clone)]
pub struct WikipediaSettings {
    pub enabled: bool,
    pub thumbnail_size: u32,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let wikipedia_file = file.wikipedia.unwrap_or_default();
        let wikipedia = WikipediaSettings {
            enabled: wikipedia_file.enabled.unwrap_or(!cli.disable_wikipedia),
            thumbnail_size: wikipedia_file
                .thumbnail_size
                .unwrap_or(DEFAULT_THUMBNAIL_SIZE),
        };

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            wikipedia,
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn library_db_path(&self) -> PathBuf {
        self.db_dir.join("library.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("path"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(matches!(
            parse_logging_level("headers"),
            Some(RequestsLoggingLevel::Headers)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        // Invalid
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 3001,
            logging_level: RequestsLoggingLevel::Headers,
            frontend_dir_path: Some("/frontend".to_string()),
            disable_wikipedia: false,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.port, 3001);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
        assert!(config.wikipedia.enabled);
        assert_eq!(config.wikipedia.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            port: Some(4000),
            logging_level: Some("headers".to_string()),
            wikipedia: Some(WikipediaConfig {
                enabled: Some(false),
                thumbnail_size: Some(250),
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert!(!config.wikipedia.enabled);
        assert_eq!(config.wikipedia.thumbnail_size, 250);
    }

    #[test]
    fn test_resolve_missing_db_dir_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_disable_wikipedia_from_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            disable_wikipedia: true,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(!config.wikipedia.enabled);
    }

    #[test]
    fn test_db_path_helpers() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.user_db_path(), temp_dir.path().join("user.db"));
        assert_eq!(config.library_db_path(), temp_dir.path().join("library.db"));
    }
}
