//! `clinic.toml`: where the reference data lives, where scenarios are kept,
//! and how much to log.
//!
//! Every section and key is optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clinic_core::store::StoreConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "clinic.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the reference CSV tables.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    /// Published hiring price list.
    #[serde(default = "default_price_list")]
    pub price_list: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Registered storage backend: `csv` or `memory`.
    #[serde(default = "default_ledger_backend")]
    pub backend: String,
    /// Backend-specific location; a file path for `csv`.
    #[serde(default = "default_ledger_location")]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or full filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append log records to this file as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub ledger_backend: Option<String>,
    pub ledger_location: Option<String>,
    pub log_level: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_price_list() -> PathBuf {
    PathBuf::from("andtalent_pricing.csv")
}

fn default_ledger_backend() -> String {
    StoreConfig::default().backend
}

fn default_ledger_location() -> String {
    StoreConfig::default().location
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            price_list: default_price_list(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: default_ledger_backend(),
            location: default_ledger_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Reads `path` (or `clinic.toml` in the working directory). A missing
    /// file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("failed parsing TOML config: {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub fn apply_overrides(
        &mut self,
        overrides: ConfigOverrides,
    ) {
        if let Some(dir) = overrides.data_dir {
            self.data.dir = dir;
        }
        if let Some(backend) = overrides.ledger_backend {
            self.ledger.backend = backend;
        }
        if let Some(location) = overrides.ledger_location {
            self.ledger.location = location;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.ledger.backend.clone(),
            location: self.ledger.location.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed rendering config as TOML")
    }

    /// Writes the commented template to `path`. Refuses to replace an
    /// existing file unless `force` is set.
    pub fn write_template(
        path: &Path,
        force: bool,
    ) -> Result<()> {
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[data]
# Directory with treatment_prices.csv, treatment_costs.csv, dsp.csv,
# <program>_treatments.csv, <program>_event_cost.csv and <program>_cashflow.csv
dir = "data"
price_list = "andtalent_pricing.csv"

[ledger]
# "csv" keeps saved scenarios in a file; "memory" forgets them on exit
backend = "csv"
location = "scenario_metrics.csv"

[logging]
level = "warn"
# file = "clinic-projections.log"
"#;
        template.to_string()
    }
}
