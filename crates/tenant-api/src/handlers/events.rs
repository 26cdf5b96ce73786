use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use tenant_shared::utils::workspace_channel;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/workspaces/{id}/events
///
/// Server-sent stream of the events published on the workspace channel.
pub async fn stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    state.workspaces.get_workspace(&id).await?;

    let channel = workspace_channel(&id);
    let rx = state.events.subscribe();
    debug!(channel = %channel, "Event stream opened");

    let events = stream::unfold((rx, channel), |(mut rx, channel)| async move {
        loop {
            match rx.recv().await {
                Ok(message) if message.channel == channel => {
                    let event = Event::default()
                        .event(message.event.as_str())
                        .json_data(&message.payload)
                        .unwrap_or_else(|_| Event::default().event("error"));
                    return Some((Ok(event), (rx, channel)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(channel = %channel, skipped, "Event stream lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
