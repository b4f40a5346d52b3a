use super::defaults::MAX_PLACEMENT_TRIALS;
use super::settings::AppConfig;
use anyhow::Result;

impl AppConfig {
    /// Validate configuration values are sane.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.port > 0, "Port must be > 0");
        anyhow::ensure!(self.headroom >= 0, "headroom must be >= 0, got {}", self.headroom);
        anyhow::ensure!(
            self.trials >= 1 && self.trials <= MAX_PLACEMENT_TRIALS,
            "trials must be between 1 and {MAX_PLACEMENT_TRIALS}"
        );
        anyhow::ensure!(self.event_capacity > 0, "event_capacity must be > 0");
        Ok(())
    }
}
