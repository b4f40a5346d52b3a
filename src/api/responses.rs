use crate::picker::{Datastore, DiskConfig, Placement};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) const fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub(crate) fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

/// Request body for PUT /api/catalog.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogRequest {
    pub datastores: CatalogEntries,
}

/// Datastores as either `[{name, free_space}]` or `{name: {free_space}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CatalogEntries {
    List(Vec<Datastore>),
    Map(NamedDatastores),
}

impl CatalogEntries {
    pub(crate) fn into_datastores(self) -> Vec<Datastore> {
        match self {
            Self::List(datastores) | Self::Map(NamedDatastores(datastores)) => datastores,
        }
    }
}

/// A `{name: {free_space}}` object, kept in document order.
#[derive(Debug)]
pub(crate) struct NamedDatastores(Vec<Datastore>);

#[derive(Debug, Deserialize)]
struct FreeSpace {
    free_space: u64,
}

impl<'de> Deserialize<'de> for NamedDatastores {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        struct NamedVisitor;

        impl<'de> Visitor<'de> for NamedVisitor {
            type Value = NamedDatastores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of datastore name to {free_space}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut datastores = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, info)) = map.next_entry::<String, FreeSpace>()? {
                    datastores.push(Datastore { name, free_space: info.free_space });
                }
                Ok(NamedDatastores(datastores))
            }
        }

        deserializer.deserialize_map(NamedVisitor)
    }
}

/// Request body for POST /api/placement.
#[derive(Debug, Deserialize)]
pub(crate) struct PlacementRequest {
    pub disks: Vec<DiskConfig>,
}

/// Request body for POST /api/placement/single.
#[derive(Debug, Deserialize)]
pub(crate) struct SinglePlacementRequest {
    pub disk: DiskConfig,
}

/// Daemon status returned by the status endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    #[serde(flatten)]
    pub status: crate::DaemonStatus,
    pub version: String,
}

/// Catalog summary after a refresh.
#[derive(Debug, Serialize)]
pub(crate) struct CatalogSummary {
    pub datastores: usize,
    pub total_free_space: u64,
    pub updated_at: DateTime<Utc>,
}

/// A computed batch placement.
#[derive(Debug, Serialize)]
pub(crate) struct PlacementResponse<'d> {
    pub placement_id: Uuid,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub placement: Placement<'d, DiskConfig>,
}

/// The datastore chosen for a single disk.
#[derive(Debug, Serialize)]
pub(crate) struct SinglePlacementResponse {
    pub placement_id: Uuid,
    pub datastore: String,
}
