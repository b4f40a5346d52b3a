use super::error::PickerError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default bytes reserved on every datastore before it counts as usable.
pub const DEFAULT_HEADROOM: i64 = 1024;

/// Default number of randomized trials per batch placement.
pub const DEFAULT_TRIALS: usize = 8;

/// Pattern used when a disk has no datastore affinity.
pub const MATCH_ANY_PATTERN: &str = ".*";

/// Anything that can report the free space of a datastore.
pub trait DatastoreInfo {
    fn free_space(&self) -> u64;
}

impl DatastoreInfo for u64 {
    fn free_space(&self) -> u64 {
        *self
    }
}

impl<T: DatastoreInfo + ?Sized> DatastoreInfo for &T {
    fn free_space(&self) -> u64 {
        (**self).free_space()
    }
}

/// The constraints describing one disk that needs a datastore.
pub trait DiskRequest {
    /// Disk size in bytes.
    fn size(&self) -> u64;

    /// Datastore the disk currently lives on, if any.
    fn existing_datastore_name(&self) -> Option<&str>;

    /// Regular expression the target datastore name must match.
    fn target_datastore_pattern(&self) -> &str;
}

impl<T: DiskRequest + ?Sized> DiskRequest for &T {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn existing_datastore_name(&self) -> Option<&str> {
        (**self).existing_datastore_name()
    }

    fn target_datastore_pattern(&self) -> &str {
        (**self).target_datastore_pattern()
    }
}

/// A datastore as seen at the last catalog refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datastore {
    pub name: String,
    pub free_space: u64,
}

impl DatastoreInfo for Datastore {
    fn free_space(&self) -> u64 {
        self.free_space
    }
}

/// Owned disk placement request, as received from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskConfig {
    pub size: u64,
    #[serde(default)]
    pub existing_datastore_name: Option<String>,
    #[serde(default = "default_pattern")]
    pub target_datastore_pattern: String,
}

fn default_pattern() -> String {
    MATCH_ANY_PATTERN.to_string()
}

impl DiskConfig {
    /// A new disk with no prior location that may go anywhere.
    pub fn new(size: u64) -> Self {
        Self { size, existing_datastore_name: None, target_datastore_pattern: default_pattern() }
    }

    #[must_use]
    pub fn on_datastore(mut self, name: impl Into<String>) -> Self {
        self.existing_datastore_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.target_datastore_pattern = pattern.into();
        self
    }
}

impl DiskRequest for DiskConfig {
    fn size(&self) -> u64 {
        self.size
    }

    fn existing_datastore_name(&self) -> Option<&str> {
        self.existing_datastore_name.as_deref()
    }

    fn target_datastore_pattern(&self) -> &str {
        &self.target_datastore_pattern
    }
}

/// Tunables for a picker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerSettings {
    /// Bytes reserved on every datastore.
    pub headroom: i64,
    /// Randomized trials evaluated per batch placement; the best-scoring one wins.
    pub trials: usize,
    /// Seed for the placement RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self { headroom: DEFAULT_HEADROOM, trials: DEFAULT_TRIALS, seed: None }
    }
}

impl PickerSettings {
    pub fn with_headroom(headroom: i64) -> Self {
        Self { headroom, ..Self::default() }
    }

    pub(crate) fn validate(&self) -> Result<(), PickerError> {
        if self.headroom < 0 {
            return Err(PickerError::NegativeHeadroom(self.headroom));
        }
        if self.trials == 0 {
            return Err(PickerError::InvalidTrials(self.trials));
        }
        Ok(())
    }
}

/// Per-datastore outcome of a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatastorePlacement<'d, D> {
    /// Free space minus headroom minus the sizes of disks moved or created here.
    pub free_space: i64,
    /// Disks assigned here, in request order.
    pub disks: Vec<&'d D>,
}

/// Result of a batch placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement<'d, D> {
    pub datastores: BTreeMap<String, DatastorePlacement<'d, D>>,
    /// Bytes of disks that have to leave the datastore they are on now.
    pub migration_size: u64,
    pub balance_score: i64,
}

impl<D> Placement<'_, D> {
    /// Name of the datastore holding the disk at `disk` (by address).
    pub fn datastore_of(&self, disk: &D) -> Option<&str> {
        self.datastores
            .iter()
            .find(|(_, ds)| ds.disks.iter().any(|d| std::ptr::eq(*d, disk)))
            .map(|(name, _)| name.as_str())
    }

    pub fn disk_count(&self) -> usize {
        self.datastores.values().map(|ds| ds.disks.len()).sum()
    }
}

/// Mutable projection of one datastore during a single placement computation.
#[derive(Debug, Clone)]
pub(super) struct WorkingDatastore<'c> {
    pub name: &'c str,
    /// Usable bytes left. Negative when free space is below headroom.
    pub remaining: i64,
    /// Indices into the request slice.
    pub disks: Vec<usize>,
}

impl<'c> WorkingDatastore<'c> {
    pub(super) fn new(datastore: &'c Datastore, headroom: i64) -> Self {
        Self {
            name: &datastore.name,
            remaining: to_signed(datastore.free_space).saturating_sub(headroom),
            disks: Vec::new(),
        }
    }

    /// Whether a disk of `size` bytes constrained by `pattern` may land here.
    pub(super) fn accepts(&self, size: i64, pattern: &Regex) -> bool {
        self.remaining >= size && pattern.is_match(self.name)
    }

    /// Record a disk that already lives here.
    pub(super) fn keep(&mut self, disk_idx: usize) {
        self.disks.push(disk_idx);
    }

    pub(super) fn assign(&mut self, disk_idx: usize, size: i64) {
        self.remaining -= size;
        self.disks.push(disk_idx);
    }

    /// Undo the most recent [`assign`](Self::assign).
    pub(super) fn unassign(&mut self, size: i64) {
        self.remaining += size;
        self.disks.pop();
    }
}

/// Byte counts are `u64` at the edges but signed in working state.
pub(super) fn to_signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// Compile the affinity pattern of a request and check its size.
pub(super) fn validate_request<D: DiskRequest + ?Sized>(disk: &D) -> Result<Regex, PickerError> {
    if disk.size() == 0 {
        return Err(PickerError::InvalidDiskSize);
    }
    let pattern = disk.target_datastore_pattern();
    Regex::new(pattern)
        .map_err(|source| PickerError::InvalidPattern { pattern: pattern.to_string(), source })
}

pub(super) fn no_valid_placement<D: DiskRequest + ?Sized>(disk: &D) -> PickerError {
    PickerError::NoValidPlacement {
        size: disk.size(),
        pattern: disk.target_datastore_pattern().to_string(),
        existing: disk.existing_datastore_name().map(str::to_string),
    }
}
