// Configuration loaded from YAML, every field optional

use crate::notify::DEFAULT_BANNER_SECS;
use crate::pending::DEFAULT_REFRESH_MINS;
use crate::repository::DEFAULT_STORAGE_KEY;
use crate::store::{FileStore, KeyValueStore, MemoryStore, SqliteStore, validate_key};
use chrono::TimeDelta;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "todolist";
const CONFIG_FILE: &str = "config.yaml";

/// One day
pub const MAX_BANNER_SECS: i64 = 24 * 60 * 60;
/// One week
pub const MAX_REFRESH_MINS: i64 = 7 * 24 * 60;

/// Which key-value store holds the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the store; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub backend: Backend,
    pub storage_key: String,
    pub banner_secs: i64,
    pub refresh_interval_mins: i64,
    pub hide_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            backend: Backend::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            banner_secs: DEFAULT_BANNER_SECS,
            refresh_interval_mins: DEFAULT_REFRESH_MINS,
            hide_completed: false,
        }
    }
}

impl Config {
    /// `$CONFIG_DIR/todolist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields the defaults; a file that exists but does not parse
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!(path = ?path, backend = ?config.backend, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.storage_key)?;
        if !(1..=MAX_BANNER_SECS).contains(&self.banner_secs) {
            return Err(eyre!(
                "banner_secs must be between 1 and {}, got {}",
                MAX_BANNER_SECS,
                self.banner_secs
            ));
        }
        if !(1..=MAX_REFRESH_MINS).contains(&self.refresh_interval_mins) {
            return Err(eyre!(
                "refresh_interval_mins must be between 1 and {}, got {}",
                MAX_REFRESH_MINS,
                self.refresh_interval_mins
            ));
        }
        Ok(())
    }

    /// How long an alert banner stays up
    pub fn banner_ttl(&self) -> Result<TimeDelta> {
        TimeDelta::try_seconds(self.banner_secs)
            .ok_or_else(|| eyre!("banner_secs out of range: {}", self.banner_secs))
    }

    /// How often pending labels are recomputed
    pub fn refresh_interval(&self) -> Result<TimeDelta> {
        TimeDelta::try_minutes(self.refresh_interval_mins).ok_or_else(|| {
            eyre!("refresh_interval_mins out of range: {}", self.refresh_interval_mins)
        })
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| eyre!("Unable to determine data directory; set data_dir in config")),
        }
    }

    /// Build the configured store adapter
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match self.backend {
            Backend::File => Box::new(FileStore::open(self.data_dir()?)?),
            Backend::Sqlite => Box::new(SqliteStore::open(self.data_dir()?.join("todolist.db"))?),
            Backend::Memory => Box::new(MemoryStore::new()),
        };
        Ok(store)
    }
}
