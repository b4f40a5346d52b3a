use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events published by the API handlers and forwarded to SSE subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    /// The datastore catalog was replaced.
    CatalogUpdated { datastores: u32, total_free_space: u64, updated_at: DateTime<Utc> },

    /// A batch placement succeeded.
    PlacementReady {
        placement_id: Uuid,
        disks: u32,
        migration_size: u64,
        balance_score: i64,
    },

    /// A single-disk pick succeeded.
    DatastorePicked { placement_id: Uuid, datastore: String, size: u64 },

    /// A placement or pick was rejected.
    PlacementFailed { placement_id: Uuid, message: String },
}

impl Event {
    /// Returns the SSE event type name for this event variant.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::CatalogUpdated { .. } => "catalog_updated",
            Self::PlacementReady { .. } => "placement_ready",
            Self::DatastorePicked { .. } => "datastore_picked",
            Self::PlacementFailed { .. } => "placement_failed",
        }
    }
}

/// The central event broadcast hub.
///
/// Handlers send events here via `publish()`. The SSE endpoint subscribes via
/// `subscribe()` and forwards events to the client.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<Event>,
}

impl EventHub {
    /// Subscribers lagging by more than `capacity` events miss the
    /// intermediate ones.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Events are fire-and-forget; having no subscribers is not an error.
    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}
