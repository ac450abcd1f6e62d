//! Configuration module for the node host.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `NODEHOST_` and use double underscores
//! to separate nested levels:
//! - `NODEHOST_HOST__ROOT=/srv/nodes` sets `host.root`
//! - `NODEHOST_HOST__MAINTENANCE_INTERVAL_MS=2000` sets `host.maintenance_interval_ms`
//! - `NODEHOST_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the workspace settings file.
pub const CONFIG_DIR: &str = ".nodehost";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "NODEHOST_";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Hosting configuration
    #[serde(default)]
    pub host: HostConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HostConfig {
    /// Primary root; new nodes are created here
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Secondary roots, scanned after the primary root in order
    #[serde(default)]
    pub other_roots: Vec<PathBuf>,

    /// Folder holding recipe templates
    #[serde(default = "default_recipes_root")]
    pub recipes_root: PathBuf,

    /// Hosting filter: only names matching one of these are hosted (empty = all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Hosting filter: names matching any of these are never hosted
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Pause between maintenance ticks
    #[serde(default = "default_maintenance_interval_ms")]
    pub maintenance_interval_ms: u64,

    /// Watch roots for changes and run maintenance early
    #[serde(default)]
    pub watch_roots: bool,

    /// Quiet period before a burst of root changes triggers maintenance
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Worker threads for the async runtime
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `nodehost::host = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_root() -> PathBuf {
    PathBuf::from("nodes")
}
fn default_recipes_root() -> PathBuf {
    PathBuf::from("recipes")
}
fn default_maintenance_interval_ms() -> u64 {
    10_000
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_worker_threads() -> usize {
    num_cpus::get()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            other_roots: Vec::new(),
            recipes_root: default_recipes_root(),
            include: Vec::new(),
            exclude: Vec::new(),
            maintenance_interval_ms: default_maintenance_interval_ms(),
            watch_roots: false,
            debounce_ms: default_debounce_ms(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl HostConfig {
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_millis(self.maintenance_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore (__) separates nesting, single underscores stay in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().replace("__", ".").into()))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.nodehost/settings.toml` from the current directory upwards
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
