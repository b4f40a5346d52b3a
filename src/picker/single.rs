use super::catalog::Catalog;
use super::error::PickerError;
use super::types::{
    no_valid_placement, to_signed, validate_request, DiskRequest, PickerSettings, WorkingDatastore,
};
use tracing::info;

/// Choose a datastore for one standalone disk.
///
/// Picks the candidate that keeps the most space after placement. Ties go to
/// the datastore listed first in the catalog.
pub(super) fn pick_datastore_for_single_disk<D: DiskRequest + ?Sized>(
    catalog: &Catalog,
    settings: &PickerSettings,
    disk: &D,
) -> Result<String, PickerError> {
    settings.validate()?;
    let pattern = validate_request(disk)?;
    let size = to_signed(disk.size());

    let mut best: Option<WorkingDatastore<'_>> = None;
    for ds in catalog {
        let candidate = WorkingDatastore::new(ds, settings.headroom);
        if !candidate.accepts(size, &pattern) {
            continue;
        }
        // Strictly greater keeps the earliest of equal candidates.
        if best.as_ref().is_none_or(|b| candidate.remaining > b.remaining) {
            best = Some(candidate);
        }
    }

    match best {
        Some(ds) => {
            info!(
                "Picked datastore {} for {}-byte disk ({} bytes left after placement)",
                ds.name,
                disk.size(),
                ds.remaining - size
            );
            Ok(ds.name.to_string())
        }
        None => Err(no_valid_placement(disk)),
    }
}
