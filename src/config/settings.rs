use super::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_EVENT_CAPACITY, DEFAULT_HEADROOM_BYTES, DEFAULT_PLACEMENT_TRIALS,
    DEFAULT_PORT,
};
use crate::picker::PickerSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub config_path: String,
    /// Bytes reserved on every datastore before it counts as usable.
    pub headroom: i64,
    /// Randomized trials per batch placement. More trials give better balance
    /// at the cost of less spread between repeated placements.
    pub trials: usize,
    /// Fixed RNG seed, for reproducible placements.
    pub seed: Option<u64>,
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            headroom: DEFAULT_HEADROOM_BYTES,
            trials: DEFAULT_PLACEMENT_TRIALS,
            seed: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load configuration, merging defaults with config file values and env overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("DP_CONFIG_PATH") {
            config.config_path = path;
        }

        let cfg_path = Path::new(&config.config_path);
        if cfg_path.exists() {
            let contents = fs::read_to_string(cfg_path)
                .with_context(|| format!("Failed to read config file: {}", config.config_path))?;
            config.parse_ini(&contents);
        }

        if let Ok(port) = std::env::var("DP_PORT") {
            config.port = port.parse().context("DP_PORT must be a valid port number")?;
        }
        if let Ok(headroom) = std::env::var("DP_HEADROOM") {
            config.headroom = headroom.parse().context("DP_HEADROOM must be an integer")?;
        }
        if let Ok(seed) = std::env::var("DP_SEED") {
            config.seed = Some(seed.parse().context("DP_SEED must be an unsigned integer")?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Settings for the picker instance this config drives.
    pub const fn picker_settings(&self) -> PickerSettings {
        PickerSettings { headroom: self.headroom, trials: self.trials, seed: self.seed }
    }
}
