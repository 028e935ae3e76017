use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::deadline::DeadlineConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "GUESTLIST_CONFIG";
/// The admin password never lives in the config file.
pub const ADMIN_PASSWORD_ENV_VAR: &str = "ADMIN_PASSWORD";

const DEFAULT_CONFIG_PATH: &str = "guestlist.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("ADMIN_PASSWORD must be set (see .env)")]
    MissingAdminPassword,
}

/// Application configuration, loaded once at startup. The core only consumes
/// the menu lists and the deadline settings; the rest feeds the pages.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub menu: MenuConfig,
    #[serde(default)]
    pub deadline: Option<DeadlineSettings>,
    #[serde(default)]
    pub event: EventConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Browser/page title.
    pub title: String,
    /// Event name shown in headings, e.g. "June & Henry's Wedding".
    pub event_name: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub banner_image: Option<String>,
}

/// Menu option lists the form offers and the validator checks against.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    pub starters: Vec<String>,
    pub mains: Vec<String>,
    pub desserts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeadlineSettings {
    #[serde(deserialize_with = "de_cutoff")]
    pub cutoff: NaiveDateTime,
    #[serde(default = "default_grace_hours")]
    pub grace_hours: i64,
    #[serde(default = "default_warning_hours")]
    pub warning_hours: i64,
}

impl DeadlineSettings {
    pub fn policy(&self) -> DeadlineConfig {
        DeadlineConfig {
            cutoff: self.cutoff,
            grace: Duration::hours(self.grace_hours),
            warning: Duration::hours(self.warning_hours),
        }
    }
}

/// Content for the event-info page. Sections render only when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub welcome: String,
    #[serde(default)]
    pub ceremony: Option<VenueConfig>,
    #[serde(default)]
    pub reception: Option<VenueConfig>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub map_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl AppConfig {
    /// Loads the config file named by `GUESTLIST_CONFIG`, falling back to
    /// `guestlist.toml` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let path = PathBuf::from(
            env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        );
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// The deadline policy, or `None` when no deadline is configured and the
    /// form accepts submissions unconditionally.
    pub fn deadline_policy(&self) -> Option<DeadlineConfig> {
        self.deadline.as_ref().map(DeadlineSettings::policy)
    }
}

/// Reads the admin password from the environment. Rejects empty values so a
/// blank `.env` line cannot open the dashboard to everyone.
pub fn admin_password_from_env() -> Result<String, ConfigError> {
    match env::var(ADMIN_PASSWORD_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingAdminPassword),
    }
}

fn default_grace_hours() -> i64 {
    24
}

fn default_warning_hours() -> i64 {
    48
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("rsvp_responses.csv")
}

fn de_cutoff<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_cutoff(&raw).map_err(serde::de::Error::custom)
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD HH:MM` with seconds zero.
fn parse_cutoff(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("invalid deadline cutoff {raw:?}, expected YYYY-MM-DD HH:MM:SS"))
}
