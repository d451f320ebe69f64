//! WebSocket connection handler: one task per channel.
//!
//! Each accepted socket is registered under its session token, greeted
//! with a ready notice, and then serviced in a strict one-request-at-a-time
//! loop: decode, execute, reply. Every per-request fault is converted into
//! a client-visible `error` message and the loop continues; only transport
//! failure ends the channel. Registry cleanup runs unconditionally when
//! the loop exits.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tracing::{debug, error, info};

use super::handlers::AppState;
use crate::execution::ExecutionResult;
use crate::protocol::{self, Outbound};
use crate::session::ChannelId;

/// Unsolicited notice sent once after the accept handshake.
const READY_MESSAGE: &str = "Execution environment ready";

/// WebSocket upgrade handler. Accepting is unconditional.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_token): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_token))
}

/// Drive one channel from accept to close.
async fn handle_socket(socket: WebSocket, state: AppState, session_token: String) {
    let channel = ChannelId::new();
    if let Err(e) = state.registry.register(&session_token, channel) {
        error!("failed to register {channel} for session {session_token}: {e}");
        return;
    }
    info!("{channel} opened for session {session_token}");

    let (mut sink, mut stream) = socket.split();

    if send_message(&mut sink, &Outbound::output(READY_MESSAGE)).await {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(data)) => {
                    if sink.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!("{channel} transport error: {e}");
                    break;
                }
            };

            if !handle_frame(&mut sink, &state, &text).await {
                break;
            }
        }
    }

    match state.registry.deregister(&session_token, channel) {
        Ok(_) => info!("{channel} closed for session {session_token}"),
        Err(e) => error!("failed to deregister {channel}: {e}"),
    }
}

/// Process one inbound text frame and send the resulting messages.
///
/// Returns `false` once the channel's transport has failed; every other
/// outcome, including decode and execution faults, leaves the channel open.
async fn handle_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    state: &AppState,
    raw: &str,
) -> bool {
    let request = match protocol::decode(raw) {
        Ok(request) => request,
        Err(e) => return send_message(sink, &Outbound::error(e.client_message())).await,
    };

    match state.executor.run_async(request.code).await {
        Ok(result) => {
            debug!("execution finished in {:?}", result.duration);
            let ExecutionResult { stdout, stderr, .. } = result;
            if !stdout.is_empty() && !send_message(sink, &Outbound::output(stdout)).await {
                return false;
            }
            if !stderr.is_empty() && !send_message(sink, &Outbound::error(stderr)).await {
                return false;
            }
            true
        }
        Err(e) => {
            error!("unexpected execution failure: {e}");
            send_message(sink, &Outbound::error(format!("Execution error: {e}"))).await
        }
    }
}

/// Send one framed message. Returns `false` on transport failure.
async fn send_message(sink: &mut SplitSink<WebSocket, Message>, message: &Outbound) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            // String payloads cannot fail to serialize; log and keep going.
            error!("failed to encode outbound message: {e}");
            true
        }
    }
}
