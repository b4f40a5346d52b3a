//! Datastore placement for virtual machine disks.
//!
//! The [`picker`] module holds the placement engine. The remaining modules
//! wrap a single picker in a small localhost daemon.

pub mod api;
pub mod config;
pub mod events;
pub mod picker;
mod state;

#[cfg(test)]
mod tests;

pub use picker::{DatastorePicker, PickerError};
pub use state::{AppState, DaemonStatus};
