use super::settings::AppConfig;
use tracing::warn;

impl AppConfig {
    /// Parse the simple KEY="VALUE" config format.
    pub fn parse_ini(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');

                match key {
                    "PORT" => parse_into(key, value, &mut self.port),
                    "HEADROOM" => parse_into(key, value, &mut self.headroom),
                    "TRIALS" => parse_into(key, value, &mut self.trials),
                    "EVENT_CAPACITY" => parse_into(key, value, &mut self.event_capacity),
                    "SEED" if value.is_empty() => self.seed = None,
                    "SEED" => match value.parse() {
                        Ok(seed) => self.seed = Some(seed),
                        Err(_) => warn!("Ignoring invalid value for {key}: {value:?}"),
                    },
                    _ => {} // Ignore unknown keys
                }
            }
        }
    }
}

/// Overwrite `slot` when `value` parses; otherwise keep the current value.
fn parse_into<T: std::str::FromStr>(key: &str, value: &str, slot: &mut T) {
    match value.parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!("Ignoring invalid value for {key}: {value:?}"),
    }
}
