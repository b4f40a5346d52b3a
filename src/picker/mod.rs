//! Disk placement: decides which datastore each virtual disk should live on.

mod catalog;
mod error;
mod planner;
mod score;
mod single;
mod types;

pub use catalog::Catalog;
pub use error::PickerError;
pub use score::balance_score;
pub use types::{
    Datastore, DatastoreInfo, DatastorePlacement, DiskConfig, DiskRequest, PickerSettings,
    Placement, DEFAULT_HEADROOM, DEFAULT_TRIALS, MATCH_ANY_PATTERN,
};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::info;

/// Owns a datastore catalog and places disks onto it.
///
/// The random source used for capacity-weighted draws is part of the picker,
/// so a seeded picker replays the same placements for the same inputs.
#[derive(Debug, Clone)]
pub struct DatastorePicker<R = Pcg64> {
    settings: PickerSettings,
    catalog: Catalog,
    rng: R,
}

impl DatastorePicker<Pcg64> {
    /// Create a picker, seeding its RNG from `settings.seed` or OS entropy.
    pub fn new(settings: PickerSettings) -> Result<Self, PickerError> {
        let rng = match settings.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }
}

impl<R: Rng> DatastorePicker<R> {
    /// Create a picker that draws from the given random source.
    pub fn with_rng(settings: PickerSettings, rng: R) -> Result<Self, PickerError> {
        settings.validate()?;
        Ok(Self { settings, catalog: Catalog::new(), rng })
    }

    /// Replace the catalog with a fresh snapshot. Entries not listed are gone.
    pub fn update<I, N, D>(&mut self, datastores: I)
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: DatastoreInfo,
    {
        self.catalog = Catalog::from_datastores(datastores);
        info!(
            "Catalog updated: {} datastore(s), {} bytes free",
            self.catalog.len(),
            self.catalog.total_free_space()
        );
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    /// Place every disk in `disks`, or fail without placing any.
    pub fn best_disk_placement<'d, D: DiskRequest>(
        &mut self,
        disks: &'d [D],
    ) -> Result<Placement<'d, D>, PickerError> {
        planner::best_disk_placement(&self.catalog, &self.settings, disks, &mut self.rng)
    }

    /// Deterministic choice for a single new disk: the roomiest candidate.
    pub fn pick_datastore_for_single_disk<D: DiskRequest + ?Sized>(
        &self,
        disk: &D,
    ) -> Result<String, PickerError> {
        single::pick_datastore_for_single_disk(&self.catalog, &self.settings, disk)
    }
}
