use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::events::EventHub;
use crate::picker::{DatastorePicker, PickerError};

/// Shared application state passed to all API handlers via axum's State extractor.
pub struct AppState {
    pub config: AppConfig,
    pub event_hub: EventHub,
    /// The daemon's single picker. Requests are serialized through this lock.
    pub picker: tokio::sync::Mutex<DatastorePicker>,
    pub status: tokio::sync::RwLock<DaemonStatus>,
}

impl AppState {
    pub fn new(config: AppConfig, event_hub: EventHub) -> Result<Self, PickerError> {
        let picker = DatastorePicker::new(config.picker_settings())?;
        Ok(Self {
            config,
            event_hub,
            picker: tokio::sync::Mutex::new(picker),
            status: tokio::sync::RwLock::new(DaemonStatus::default()),
        })
    }
}

/// Counters reported by the status endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DaemonStatus {
    pub datastores: usize,
    pub catalog_updated_at: Option<DateTime<Utc>>,
    pub placements_served: u64,
    pub placements_failed: u64,
}

impl DaemonStatus {
    pub fn catalog_refreshed(&mut self, datastores: usize, at: DateTime<Utc>) {
        self.datastores = datastores;
        self.catalog_updated_at = Some(at);
    }

    pub fn record(&mut self, succeeded: bool) {
        if succeeded {
            self.placements_served += 1;
        } else {
            self.placements_failed += 1;
        }
    }
}
