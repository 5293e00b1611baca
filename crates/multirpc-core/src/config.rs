//! Engine configuration with layered loading.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `MULTIRPC_CONFIG` env var
//! 3. **Environment variables**: `MULTIRPC__*` env vars override specific fields
//!
//! # Example
//!
//! ```toml
//! [pools.view]
//! "1" = ["https://rpc-a.example.org", "https://rpc-b.example.org"]
//! "2" = ["https://rpc-fallback.example.org"]
//!
//! [pools.transaction]
//! "1" = ["https://rpc-a.example.org"]
//!
//! [timeouts]
//! view_seconds = 10
//! broadcast_seconds = 10
//! confirmation_seconds = 90
//!
//! [transaction]
//! gas_limit = 1000000
//! enable_gas_estimation = false
//! ```
//!
//! Validation happens at load time; an invalid configuration names the
//! offending pool or URL rather than failing later inside the engine.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, time::Duration};

/// Endpoint URLs per pool, keyed by redundancy group.
///
/// Group keys are strings ("1", "2", ...); groups are consulted in key order
/// when an earlier group fails in aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolsConfig {
    /// Groups serving read calls.
    #[serde(default)]
    pub view: BTreeMap<String, Vec<String>>,

    /// Groups receiving transaction broadcasts.
    #[serde(default)]
    pub transaction: BTreeMap<String, Vec<String>>,
}

/// Per-call-type timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Timeout for view calls and generic reads in seconds. Defaults to `10`.
    #[serde(default = "default_view_seconds")]
    pub view_seconds: u64,

    /// Timeout for a single broadcast attempt in seconds. Defaults to `10`.
    #[serde(default = "default_broadcast_seconds")]
    pub broadcast_seconds: u64,

    /// Receipt poll window in seconds; doubled once when the transaction is
    /// not found in time. Defaults to `90`.
    #[serde(default = "default_confirmation_seconds")]
    pub confirmation_seconds: u64,

    /// Timeout for the per-endpoint connectivity probe at setup. Defaults to `5`.
    #[serde(default = "default_setup_seconds")]
    pub setup_seconds: u64,
}

fn default_view_seconds() -> u64 {
    10
}

fn default_broadcast_seconds() -> u64 {
    10
}

fn default_confirmation_seconds() -> u64 {
    90
}

fn default_setup_seconds() -> u64 {
    5
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            view_seconds: default_view_seconds(),
            broadcast_seconds: default_broadcast_seconds(),
            confirmation_seconds: default_confirmation_seconds(),
            setup_seconds: default_setup_seconds(),
        }
    }
}

impl TimeoutsConfig {
    #[must_use]
    pub fn view(&self) -> Duration {
        Duration::from_secs(self.view_seconds)
    }

    #[must_use]
    pub fn broadcast(&self) -> Duration {
        Duration::from_secs(self.broadcast_seconds)
    }

    #[must_use]
    pub fn confirmation(&self) -> Duration {
        Duration::from_secs(self.confirmation_seconds)
    }

    #[must_use]
    pub fn setup(&self) -> Duration {
        Duration::from_secs(self.setup_seconds)
    }
}

/// Transaction building settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Gas limit used when estimation is disabled. Defaults to `1_000_000`.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// When `true`, `eth_estimateGas` is simulated against the first
    /// endpoint of the chosen group before signing. Defaults to `false`.
    #[serde(default)]
    pub enable_gas_estimation: bool,
}

fn default_gas_limit() -> u64 {
    1_000_000
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self { gas_limit: default_gas_limit(), enable_gas_estimation: false }
    }
}

/// Root engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Endpoint URLs per pool.
    #[serde(default)]
    pub pools: PoolsConfig,

    /// Per-call-type timeouts.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Transaction building settings.
    #[serde(default)]
    pub transaction: TransactionConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `MULTIRPC__` prefix can override any
    /// value, using `__` as a separator for nested fields
    /// (e.g. `MULTIRPC__TIMEOUTS__VIEW_SECONDS=5`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed,
    /// deserialized, or fails validation.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("MULTIRPC").separator("__"))
            .build()?;

        let config: Self = builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `config/multirpc.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden with the `MULTIRPC_CONFIG`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("MULTIRPC_CONFIG")
            .unwrap_or_else(|_| "config/multirpc.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - the view and transaction pools each hold at least one URL
    /// - no group is declared empty
    /// - every URL starts with `http://` or `https://`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Message`] naming the offending pool or URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_pool("view", &self.pools.view)?;
        Self::validate_pool("transaction", &self.pools.transaction)?;

        if self.timeouts.view_seconds == 0 ||
            self.timeouts.broadcast_seconds == 0 ||
            self.timeouts.confirmation_seconds == 0 ||
            self.timeouts.setup_seconds == 0
        {
            return Err(ConfigError::Message("timeouts must be greater than zero".to_string()));
        }

        Ok(())
    }

    fn validate_pool(
        name: &str,
        groups: &BTreeMap<String, Vec<String>>,
    ) -> Result<(), ConfigError> {
        if groups.values().all(Vec::is_empty) {
            return Err(ConfigError::Message(format!(
                "pool '{name}' has no endpoint urls configured"
            )));
        }

        for (key, urls) in groups {
            if urls.is_empty() {
                return Err(ConfigError::Message(format!(
                    "pool '{name}' group '{key}' is declared but empty"
                )));
            }
            for url in urls {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Message(format!(
                        "pool '{name}' group '{key}': invalid url '{url}'"
                    )));
                }
            }
        }

        Ok(())
    }
}
