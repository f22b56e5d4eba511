//! WebSocket upgrade handler and per-session socket loops.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use modhub_entity::user::User;
use modhub_realtime::OutboundMessage;
use modhub_realtime::connection::heartbeat::run_heartbeat;
use modhub_realtime::message::serializer::serialize_outbound;

use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// How long a closing session may spend flushing queued frames.
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /ws?user_id={id}: WebSocket upgrade
///
/// Unknown and banned users are refused before the upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let user = state.hub.active_user(&query.user_id)?;
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user, socket)))
}

/// Handles an established WebSocket connection.
///
/// A writer task drains the session queue into the socket while this task
/// reads frames and hands them to the hub one at a time, so frames from
/// one session are processed in arrival order.
async fn handle_ws_connection(state: AppState, user: User, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let engine = state.realtime.clone();

    let (handle, mut outbound_rx) = engine.sessions.register(user.id, user.username.clone());
    let session_id = handle.id;
    let mut shutdown = engine.shutdown_receiver();

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serialize_outbound(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "Failed to serialize outbound frame");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.close().await;
    });

    let heartbeat = tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.metrics.record_received();
                    state.hub.handle_inbound(&handle, text.as_str()).await;
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    handle.touch().await;
                }
                Some(Ok(Message::Binary(_))) => {
                    handle.send(OutboundMessage::error(
                        "INVALID_MESSAGE",
                        "Binary frames are not supported",
                    ));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(session_id = %session_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = handle.closed() => {
                debug!(session_id = %session_id, "Session closed by server");
                break;
            }
            _ = shutdown.recv() => {
                debug!(session_id = %session_id, "Session closing for shutdown");
                break;
            }
        }
    }

    // The writer stops once every sender is gone, after flushing frames
    // queued before the close (a ban notice, for one).
    heartbeat.abort();
    let _ = heartbeat.await;
    engine.sessions.unregister(&session_id);
    drop(handle);
    let writer_abort = writer.abort_handle();
    if tokio::time::timeout(WRITER_FLUSH_TIMEOUT, writer).await.is_err() {
        warn!(session_id = %session_id, "Outbound queue not flushed before close");
        writer_abort.abort();
    }

    info!(
        session_id = %session_id,
        user_id = %user.id,
        "WebSocket connection closed"
    );
}
