//! Mining configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use pss_core::constants::{
    DEFAULT_MAX_MINING_ATTEMPTS, DEFAULT_MINING_WORKERS, MAX_MINING_WORKERS,
};
use pss_core::error::{PssError, Result};

/// Limits and parallelism for the nonce search in wrap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Total nonce attempts across all workers
    pub max_attempts: u64,
    /// Number of threads searching disjoint nonce ranges
    pub workers: usize,
    /// Wall-clock limit for the search (None = attempts only)
    #[serde(rename = "timeout_ms", with = "optional_millis")]
    pub timeout: Option<Duration>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_MINING_ATTEMPTS,
            workers: DEFAULT_MINING_WORKERS,
            timeout: None,
        }
    }
}

impl MiningConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt budget.
    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the number of mining threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets a wall-clock limit.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses one worker per available CPU, up to `MAX_MINING_WORKERS`.
    pub fn parallel(mut self) -> Self {
        self.workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_MINING_WORKERS)
            .min(MAX_MINING_WORKERS);
        self
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(PssError::ConfigError("max_attempts must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(PssError::ConfigError("workers must be at least 1".into()));
        }
        if self.workers > MAX_MINING_WORKERS {
            return Err(PssError::ConfigError(format!(
                "workers must be at most {}, got {}",
                MAX_MINING_WORKERS, self.workers
            )));
        }
        Ok(())
    }

    /// Loads and validates a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => {
                let millis = u64::try_from(d.as_millis())
                    .map_err(|_| S::Error::custom("timeout does not fit in u64 milliseconds"))?;
                serializer.serialize_some(&millis)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
