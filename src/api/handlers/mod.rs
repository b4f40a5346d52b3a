mod catalog;
mod placement;
mod settings;
mod sse;
mod status;

pub(super) use catalog::{get_catalog, update_catalog};
pub(super) use placement::{pick_single_disk, place_disks};
pub(super) use settings::get_settings;
pub(super) use sse::sse_events;
pub(super) use status::get_status;
