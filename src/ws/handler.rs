//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::arena::Arena;
use crate::game::registry::PositionUpdate;
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    // Connection identity doubles as the player id for this session
    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, "New WebSocket connection");

    // Idempotent; covers deployments that skip the start in main
    state.broadcaster.start();

    let (mut ws_sink, mut ws_stream) = socket.split();

    let mut outbound_rx = state.hub.register(connection_id);

    // Spawn writer task: hub channel -> WebSocket
    let writer_id = connection_id;
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(connection_id = %writer_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    let rate_limiter = PlayerRateLimiter::new();

    // Reader loop: WebSocket -> arena, one event at a time in arrival order
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(connection_id = %connection_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => dispatch(&state.arena, connection_id, client_msg),
                    Err(e) => {
                        warn!(connection_id = %connection_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(connection_id = %connection_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup on disconnect: stop receiving broadcasts first, then tell
    // the remaining players
    state.hub.unregister(&connection_id);
    state.arena.handle_disconnect(connection_id);

    writer_handle.abort();

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Route a parsed client message into the arena
fn dispatch(arena: &Arena, connection_id: Uuid, msg: ClientMsg) {
    match msg {
        ClientMsg::Join { username } => {
            arena.handle_join(connection_id, username);
        }
        ClientMsg::Update {
            position,
            rotation,
            velocity,
            timestamp,
        } => {
            arena.handle_update(
                connection_id,
                PositionUpdate {
                    position,
                    rotation,
                    velocity,
                    timestamp,
                },
            );
        }
        ClientMsg::Shoot { target_id } => {
            arena.handle_shoot(connection_id, target_id);
        }
        ClientMsg::Respawn => {
            arena.handle_respawn(connection_id);
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
