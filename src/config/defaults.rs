use crate::picker::{DEFAULT_HEADROOM, DEFAULT_TRIALS};

/// Default path of the daemon's config file.
pub(super) const DEFAULT_CONFIG_PATH: &str = "/etc/datastore-picker/datastore-picker.cfg";

/// Default port the daemon listens on (localhost only).
pub(super) const DEFAULT_PORT: u16 = 7092;

/// Default bytes reserved on every datastore.
pub(super) const DEFAULT_HEADROOM_BYTES: i64 = DEFAULT_HEADROOM;

/// Default randomized trials per batch placement.
pub(super) const DEFAULT_PLACEMENT_TRIALS: usize = DEFAULT_TRIALS;

/// Upper bound on trials accepted from configuration.
pub(super) const MAX_PLACEMENT_TRIALS: usize = 1024;

/// Default capacity of the SSE event channel.
pub(super) const DEFAULT_EVENT_CAPACITY: usize = 256;
