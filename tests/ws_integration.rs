//! End-to-end WebSocket tests using a real client against a bound listener.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::{timeout, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use code_tunnel::api::{create_router_with_state, AppState};

const TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Boot a test server on an ephemeral port.
///
/// Returns the base WS URL and the shared state for registry assertions.
async fn boot_server() -> (String, AppState) {
    let state = AppState::new();
    let app = create_router_with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{addr}/ws"), state)
}

async fn connect(base: &str, session: &str) -> WsStream {
    let (ws, _) = timeout(TIMEOUT, connect_async(format!("{base}/{session}")))
        .await
        .expect("connect timed out")
        .expect("connect failed");
    ws
}

async fn send_text(ws: &mut WsStream, text: &str) {
    timeout(TIMEOUT, ws.send(Message::text(text.to_string())))
        .await
        .expect("send timed out")
        .expect("send failed");
}

async fn send_execute(ws: &mut WsStream, code: &str) {
    let frame = json!({"type": "execute", "code": code}).to_string();
    send_text(ws, &frame).await;
}

/// Receive the next text frame as JSON, skipping control frames.
async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("receive timed out")
            .expect("stream ended")
            .expect("transport error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("frame is not valid JSON");
        }
    }
}

/// Consume the ready notice sent after accept.
async fn recv_ready(ws: &mut WsStream) {
    let msg = recv_json(ws).await;
    assert_eq!(
        msg,
        json!({"type": "output", "content": "Execution environment ready"})
    );
}

/// Poll a registry condition until it holds or the deadline passes.
async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for: {description}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_ready_message_on_connect() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;
}

#[tokio::test]
async fn test_execute_returns_stdout_as_output() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_execute(&mut ws, "print('hi')").await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg, json!({"type": "output", "content": "hi\n"}));
}

#[tokio::test]
async fn test_runtime_error_returned_as_error() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_execute(&mut ws, "error('boom')").await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["type"], "error");
    assert!(msg["content"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_stdout_then_stderr_for_mixed_run() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_execute(&mut ws, "print('before')\nerror('boom')").await;

    let first = recv_json(&mut ws).await;
    assert_eq!(first, json!({"type": "output", "content": "before\n"}));

    let second = recv_json(&mut ws).await;
    assert_eq!(second["type"], "error");
    assert!(second["content"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_channel_survives_execution_fault() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_execute(&mut ws, "error('boom')").await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg["type"], "error");

    // The same channel must accept a further request.
    send_execute(&mut ws, "print('still alive')").await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg, json!({"type": "output", "content": "still alive\n"}));
}

#[tokio::test]
async fn test_malformed_frame_reports_invalid_format() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_text(&mut ws, "this is not json").await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg, json!({"type": "error", "content": "Invalid message format"}));

    // Channel stays open.
    send_execute(&mut ws, "print(1)").await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "output", "content": "1\n"})
    );
}

#[tokio::test]
async fn test_wrong_type_reports_invalid_type() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_text(&mut ws, r#"{"type": "evaluate", "code": "print(1)"}"#).await;
    let msg = recv_json(&mut ws).await;
    assert_eq!(msg, json!({"type": "error", "content": "Invalid message type"}));
}

#[tokio::test]
async fn test_missing_code_reported() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    send_text(&mut ws, r#"{"type": "execute"}"#).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "error", "content": "No code provided"})
    );

    send_text(&mut ws, r#"{"type": "execute", "code": ""}"#).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "error", "content": "No code provided"})
    );
}

#[tokio::test]
async fn test_no_binding_leakage_between_requests() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    // Produces no output at all; the next frame received answers the
    // second request.
    send_execute(&mut ws, "x = 1").await;
    send_execute(&mut ws, "print(x)").await;

    let msg = recv_json(&mut ws).await;
    assert_eq!(msg, json!({"type": "output", "content": "nil\n"}));
}

#[tokio::test]
async fn test_session_registered_while_open() {
    let (base, state) = boot_server().await;

    assert_eq!(state.registry.session_count(), 0);

    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;
    assert!(state.registry.contains("alpha"));
    assert_eq!(state.registry.session_count(), 1);

    // A second channel on the same session keeps a single key.
    let mut ws2 = connect(&base, "alpha").await;
    recv_ready(&mut ws2).await;
    assert_eq!(state.registry.session_count(), 1);
    assert_eq!(state.registry.channel_count("alpha"), 2);
}

#[tokio::test]
async fn test_session_removed_when_last_channel_closes() {
    let (base, state) = boot_server().await;

    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;
    let mut ws2 = connect(&base, "alpha").await;
    recv_ready(&mut ws2).await;

    ws.close(None).await.unwrap();
    drop(ws);
    wait_until("first channel deregistered", || {
        state.registry.channel_count("alpha") == 1
    })
    .await;
    assert!(state.registry.contains("alpha"));

    ws2.close(None).await.unwrap();
    drop(ws2);
    wait_until("session removed", || !state.registry.contains("alpha")).await;
    assert_eq!(state.registry.session_count(), 0);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let (base, state) = boot_server().await;

    let mut alpha = connect(&base, "alpha").await;
    recv_ready(&mut alpha).await;
    let mut beta = connect(&base, "beta").await;
    recv_ready(&mut beta).await;

    assert_eq!(state.registry.session_count(), 2);

    // A binding made on one channel is invisible on the other.
    send_execute(&mut alpha, "secret = 'alpha'").await;
    send_execute(&mut beta, "print(secret)").await;
    assert_eq!(
        recv_json(&mut beta).await,
        json!({"type": "output", "content": "nil\n"})
    );

    // A fault on one channel leaves the other fully usable.
    send_execute(&mut alpha, "error('boom')").await;
    assert_eq!(recv_json(&mut alpha).await["type"], "error");
    send_execute(&mut beta, "print('fine')").await;
    assert_eq!(
        recv_json(&mut beta).await,
        json!({"type": "output", "content": "fine\n"})
    );

    alpha.close(None).await.unwrap();
    drop(alpha);
    wait_until("alpha removed", || !state.registry.contains("alpha")).await;
    assert!(state.registry.contains("beta"));
}

#[tokio::test]
async fn test_many_channels_open_close() {
    let (base, state) = boot_server().await;

    let mut sockets = Vec::new();
    for _ in 0..10 {
        let mut ws = connect(&base, "shared").await;
        recv_ready(&mut ws).await;
        sockets.push(ws);
    }
    assert_eq!(state.registry.session_count(), 1);
    assert_eq!(state.registry.channel_count("shared"), 10);

    for mut ws in sockets {
        ws.close(None).await.unwrap();
    }
    wait_until("all channels closed", || !state.registry.contains("shared")).await;
    assert_eq!(state.registry.session_count(), 0);
}

#[tokio::test]
async fn test_requests_answered_in_order() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    for i in 0..5 {
        send_execute(&mut ws, &format!("print({i})")).await;
    }
    for i in 0..5 {
        assert_eq!(
            recv_json(&mut ws).await,
            json!({"type": "output", "content": format!("{i}\n")})
        );
    }
}

#[tokio::test]
async fn test_ping_answered_with_pong() {
    let (base, _state) = boot_server().await;
    let mut ws = connect(&base, "alpha").await;
    recv_ready(&mut ws).await;

    ws.send(Message::Ping(vec![1, 2, 3].into())).await.unwrap();
    let msg = timeout(TIMEOUT, ws.next())
        .await
        .expect("receive timed out")
        .expect("stream ended")
        .expect("transport error");
    assert!(matches!(msg, Message::Pong(data) if data.as_ref() == [1, 2, 3]));
}
