use crate::api::responses::{
    ApiResponse, PlacementRequest, PlacementResponse, SinglePlacementRequest,
    SinglePlacementResponse,
};
use crate::events::Event;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) async fn place_disks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlacementRequest>,
) -> Response {
    let placement_id = Uuid::new_v4();

    let result = state.picker.lock().await.best_disk_placement(&req.disks);

    state.status.write().await.record(result.is_ok());

    match result {
        Ok(placement) => {
            state.event_hub.publish(Event::PlacementReady {
                placement_id,
                disks: req.disks.len() as u32,
                migration_size: placement.migration_size,
                balance_score: placement.balance_score,
            });

            // The placement borrows the request body, so render it here.
            Json(ApiResponse::ok(PlacementResponse {
                placement_id,
                computed_at: Utc::now(),
                placement,
            }))
            .into_response()
        }
        Err(e) => {
            state
                .event_hub
                .publish(Event::PlacementFailed { placement_id, message: e.to_string() });
            Json(ApiResponse::<PlacementResponse<'_>>::err(format!("Placement failed: {e}")))
                .into_response()
        }
    }
}

pub(crate) async fn pick_single_disk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SinglePlacementRequest>,
) -> impl IntoResponse {
    let placement_id = Uuid::new_v4();

    let result = state.picker.lock().await.pick_datastore_for_single_disk(&req.disk);

    state.status.write().await.record(result.is_ok());

    match result {
        Ok(datastore) => {
            state.event_hub.publish(Event::DatastorePicked {
                placement_id,
                datastore: datastore.clone(),
                size: req.disk.size,
            });
            Json(ApiResponse::ok(SinglePlacementResponse { placement_id, datastore }))
        }
        Err(e) => {
            state
                .event_hub
                .publish(Event::PlacementFailed { placement_id, message: e.to_string() });
            Json(ApiResponse::<SinglePlacementResponse>::err(format!("Placement failed: {e}")))
        }
    }
}
