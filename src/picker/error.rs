use thiserror::Error;

/// Errors raised by the placement engine and the single-disk picker.
#[derive(Debug, Error)]
pub enum PickerError {
    /// At least one disk had no datastore matching its pattern with enough
    /// remaining capacity. Nothing was placed.
    #[error(
        "No valid placement for disk of {size} bytes (pattern '{pattern}', existing datastore: {})",
        .existing.as_deref().unwrap_or("none")
    )]
    NoValidPlacement { size: u64, pattern: String, existing: Option<String> },

    #[error("Headroom must be non-negative, got {0}")]
    NegativeHeadroom(i64),

    #[error("Invalid datastore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Disk size must be greater than zero")]
    InvalidDiskSize,

    #[error("Placement trials must be at least 1, got {0}")]
    InvalidTrials(usize),
}

impl PickerError {
    /// True for errors caused by bad input rather than lack of capacity.
    pub const fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::NoValidPlacement { .. })
    }
}
