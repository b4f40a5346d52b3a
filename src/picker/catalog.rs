use super::types::{Datastore, DatastoreInfo};
use serde::Serialize;

/// Snapshot of the datastores available for placement.
///
/// Entries keep the order they were supplied in; that order breaks ties in
/// the single-disk picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<Datastore>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `(name, datastore)` pairs.
    ///
    /// A name seen twice keeps its first position and the last free space.
    pub fn from_datastores<I, N, D>(datastores: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: DatastoreInfo,
    {
        let mut entries: Vec<Datastore> = Vec::new();
        for (name, info) in datastores {
            let name = name.into();
            let free_space = info.free_space();
            match entries.iter_mut().find(|ds| ds.name == name) {
                Some(existing) => existing.free_space = free_space,
                None => entries.push(Datastore { name, free_space }),
            }
        }
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Datastore> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Datastore> {
        self.entries.iter().find(|ds| ds.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_free_space(&self) -> u64 {
        self.entries.iter().map(|ds| ds.free_space).fold(0, u64::saturating_add)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Datastore;
    type IntoIter = std::slice::Iter<'a, Datastore>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
