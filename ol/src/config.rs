//! OrderLedger configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main OrderLedger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source CSV
    #[serde(rename = "input-path")]
    pub input_path: PathBuf,

    /// SQLite ledger file
    #[serde(rename = "store-path")]
    pub store_path: PathBuf,

    /// Directory receiving report tables
    #[serde(rename = "reports-dir")]
    pub reports_dir: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Sample data generation
    pub sample: SampleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(crate::DEFAULT_INPUT_PATH),
            store_path: PathBuf::from(crate::DEFAULT_STORE_PATH),
            reports_dir: PathBuf::from(crate::DEFAULT_REPORTS_DIR),
            log_level: None,
            sample: SampleConfig::default(),
        }
    }
}

impl Config {
    /// Config file to use: the explicit path, else `.orderledger.yml`, else
    /// `~/.config/orderledger/orderledger.yml`, else none
    pub fn locate(config_path: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.clone());
        }

        let local_config = PathBuf::from(".orderledger.yml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("orderledger").join("orderledger.yml"))
            .filter(|path| path.exists())
    }

    /// Load `path`, or defaults when there is no config file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

/// Sample data generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Number of order rows
    pub records: usize,

    /// Number of distinct vendors (V001, V002, ...)
    pub vendors: usize,

    /// Days of history before the anchor date
    pub days: u32,

    /// RNG seed
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            records: 1000,
            vendors: 100,
            days: 30,
            seed: 42,
        }
    }
}
