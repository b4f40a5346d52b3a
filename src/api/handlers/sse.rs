use crate::events::Event;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

pub(crate) async fn sse_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.event_hub.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(
        |result: Result<Event, BroadcastStreamRecvError>| match result {
            Ok(event) => serde_json::to_string(&event)
                .ok()
                .map(|json| Ok(SseEvent::default().event(event.event_type()).data(json))),
            Err(e) => {
                warn!("SSE subscriber dropped events: {e}");
                None
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
