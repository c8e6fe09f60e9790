use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::viewmodel::DEFAULT_IDLE_GRACE;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".movie-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "catalog.sqlite";
const LOG_FILE_NAME: &str = "movie-catalog.log";

pub const DB_PATH_VAR: &str = "MOVIE_CATALOG_DB";
pub const IDLE_GRACE_VAR: &str = "MOVIE_CATALOG_IDLE_GRACE_MS";
pub const SEED_VAR: &str = "MOVIE_CATALOG_SEED";

/// Startup settings. Defaults live under the user's home directory; each can
/// be overridden through an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    /// How long list and join states keep their live queries without an
    /// observer.
    pub idle_grace: Duration,
    /// Insert the demonstration dataset when the catalog starts out empty.
    pub seed_when_empty: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let data_dir = data_dir()?;
        Self::from_lookup(data_dir, |key| env::var(key).ok())
    }

    /// Build the configuration from `data_dir` and a variable lookup. Split out
    /// of [`AppConfig::load`] so tests do not touch the process environment.
    pub fn from_lookup(
        data_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let db_path = lookup(DB_PATH_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));

        let idle_grace = match lookup(IDLE_GRACE_VAR) {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{IDLE_GRACE_VAR} must be a whole number of milliseconds"))?,
            ),
            None => DEFAULT_IDLE_GRACE,
        };

        let seed_when_empty = match lookup(SEED_VAR) {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow!("{SEED_VAR} must be one of 1/0/true/false/yes/no"))?,
            None => true,
        };

        Ok(Self {
            db_path,
            log_path: data_dir.join(LOG_FILE_NAME),
            idle_grace,
            seed_when_empty,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
