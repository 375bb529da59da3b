//! Configuration management for weibo-repost

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub instagram: Option<InstagramConfig>,
    pub twitter: Option<TwitterConfig>,
    /// Base directory for resolving a post's local image files.
    pub local_image_directory: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_post_delay_seconds")]
    pub post_delay_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

fn default_batch_size() -> u32 {
    20
}

fn default_post_delay_seconds() -> u64 {
    5
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("REPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("weibo-repost").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(
            r#"
            local_image_directory = "/data/weibo/images"
            batch_size = 50
            post_delay_seconds = 10

            [database]
            path = "/tmp/repost.db"

            [instagram]
            username = "user"
            password = "pass"

            [twitter]
            email = "user@example.com"
            username = "user"
            password = "pass"
            "#,
        );

        assert_eq!(config.database.path, "/tmp/repost.db");
        assert_eq!(config.instagram.unwrap().username, "user");
        assert_eq!(config.twitter.unwrap().email, "user@example.com");
        assert_eq!(config.local_image_directory, "/data/weibo/images");
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.post_delay_seconds, 10);
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(
            r#"
            local_image_directory = "/data/weibo/images"

            [database]
            path = "/tmp/repost.db"
            "#,
        );

        assert_eq!(config.batch_size, 20);
        assert_eq!(config.post_delay_seconds, 5);
        assert!(config.instagram.is_none());
        assert!(config.twitter.is_none());
    }

    #[test]
    fn test_load_from_missing_path_is_read_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.toml"));
        match result {
            Err(crate::error::RepostError::Config(ConfigError::ReadError(_))) => {}
            other => panic!("Expected ConfigError::ReadError, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_load_from_path_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            local_image_directory = "/images"

            [database]
            path = "/tmp/repost.db"
            "#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.local_image_directory, "/images");
    }
}
