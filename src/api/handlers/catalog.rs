use crate::api::responses::{ApiResponse, CatalogRequest, CatalogSummary};
use crate::events::Event;
use crate::picker::Catalog;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;

pub(crate) async fn get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let catalog = state.picker.lock().await.catalog().clone();
    Json(ApiResponse::<Catalog>::ok(catalog))
}

pub(crate) async fn update_catalog(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CatalogRequest>,
) -> impl IntoResponse {
    let (datastores, total_free_space) = {
        let mut picker = state.picker.lock().await;
        let entries = req.datastores.into_datastores();
        picker.update(entries.into_iter().map(|ds| (ds.name, ds.free_space)));
        (picker.catalog().len(), picker.catalog().total_free_space())
    };

    let updated_at = Utc::now();
    state.status.write().await.catalog_refreshed(datastores, updated_at);

    state.event_hub.publish(Event::CatalogUpdated {
        datastores: datastores as u32,
        total_free_space,
        updated_at,
    });

    Json(ApiResponse::ok(CatalogSummary { datastores, total_free_space, updated_at }))
}
