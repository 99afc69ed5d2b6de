//! Integration tests for the match client
//!
//! These tests run the real join request and websocket against an in-process
//! mock match server and drive the client through its event queue.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use pong_client::client::{Client, Phase};
use pong_client::config::{Args, ClientConfig};
use pong_client::error::JoinFailure;
use pong_client::event::ClientEvent;
use pong_client::game::RenderModel;
use pong_client::input::{KeyEvent, LogicalKey};
use pong_client::network::{ConnectionManager, ConnectionState};
use pong_client::rendering::Render;
use pong_client::session::{SessionBroker, SessionHandle};
use serde_json::{json, Value};
use shared::{Direction, ServerMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

const WAIT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<RenderModel>,
}

impl Render for RecordingRenderer {
    fn render(&mut self, model: &RenderModel) {
        self.frames.push(model.clone());
    }
}

/// What the mock server does for one test.
#[derive(Clone)]
struct Script {
    join_status: StatusCode,
    join_body: String,
    /// Text frames pushed once the player has announced readiness.
    frames: Vec<String>,
    close_after_frames: bool,
}

impl Script {
    fn joined(frames: Vec<Value>) -> Self {
        Self {
            join_status: StatusCode::OK,
            join_body: json!({"game_key": "abc", "player_id": "p1"}).to_string(),
            frames: frames.into_iter().map(|f| f.to_string()).collect(),
            close_after_frames: false,
        }
    }

    fn join_reply(status: StatusCode, body: &str) -> Self {
        Self {
            join_status: status,
            join_body: body.to_string(),
            frames: Vec::new(),
            close_after_frames: false,
        }
    }
}

#[derive(Clone)]
struct MockState {
    script: Arc<Script>,
    received: mpsc::UnboundedSender<(String, Value)>,
}

struct MockServer {
    addr: SocketAddr,
    /// (game key, message) for every text frame the client sent.
    received: mpsc::UnboundedReceiver<(String, Value)>,
}

impl MockServer {
    async fn start(script: Script) -> Self {
        let (tx, received) = mpsc::unbounded_channel();
        let state = MockState {
            script: Arc::new(script),
            received: tx,
        };

        let app = Router::new()
            .route("/match/join/", get(join))
            .route("/ws/game/{game_key}/", get(game_socket))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, received }
    }

    fn config(&self) -> ClientConfig {
        let server = format!("http://{}", self.addr);
        let args = Args::try_parse_from(["pong-client", "--server", server.as_str()]).unwrap();
        ClientConfig::from_args(&args).unwrap()
    }

    async fn next_message(&mut self) -> (String, Value) {
        timeout(WAIT, self.received.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("mock server channel closed")
    }
}

async fn join(State(state): State<MockState>) -> impl IntoResponse {
    (state.script.join_status, state.script.join_body.clone())
}

async fn game_socket(
    ws: WebSocketUpgrade,
    Path(game_key): Path<String>,
    State(state): State<MockState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_player(socket, game_key, state))
}

async fn serve_player(mut socket: WebSocket, game_key: String, state: MockState) {
    // Hold back the script until the player says it is ready.
    loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                let ready = value["action"] == "ready";
                let _ = state.received.send((game_key.clone(), value));
                if ready {
                    break;
                }
            }
            Some(Ok(_)) => continue,
            _ => return,
        }
    }

    for frame in &state.script.frames {
        if socket.send(Message::Text(frame.clone().into())).await.is_err() {
            return;
        }
    }

    if state.script.close_after_frames {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 1000,
                reason: "match over".into(),
            })))
            .await;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                let _ = state.received.send((game_key.clone(), value));
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn connect(
    server: &MockServer,
) -> (ConnectionManager, mpsc::UnboundedReceiver<ClientEvent>) {
    let config = server.config();
    let broker = SessionBroker::new(config.join_url().unwrap(), config.join_timeout).unwrap();
    let handle = assert_ok!(broker.join_match().await);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut connection = ConnectionManager::new(handle.clone());
    let url = config.game_url(handle.game_key()).unwrap();
    assert_ok!(connection.connect(&url, config.connect_timeout, events_tx).await);

    (connection, events_rx)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for a client event")
        .expect("event queue closed")
}

fn press(code: &str) -> ClientEvent {
    ClientEvent::Key(KeyEvent::press(LogicalKey::from_code(code).unwrap()))
}

/// SESSION LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    /// Join, open, ready, start signal, one key press: exactly one move goes out.
    #[tokio::test]
    async fn join_connect_start_and_move() {
        let mut server =
            MockServer::start(Script::joined(vec![json!({"status": "game_starting"})])).await;

        let (connection, mut events) = connect(&server).await;
        assert_eq!(connection.state(), ConnectionState::Open);
        assert_eq!(
            connection.handle(),
            Some(&SessionHandle::new("abc", "p1"))
        );

        let (game_key, ready) = server.next_message().await;
        assert_eq!(game_key, "abc");
        assert_eq!(ready, json!({"action": "ready", "player_id": "p1"}));

        let mut client = Client::new(connection, RecordingRenderer::default());
        let event = next_event(&mut events).await;
        assert_eq!(event, ClientEvent::Server(ServerMessage::GameStarting));
        client.handle_event(event);
        assert_eq!(client.phase(), Phase::Playing);

        client.handle_event(press("KeyW"));
        // Same direction through the alias binding: nothing new to send.
        client.handle_event(press("ArrowUp"));

        let (_, movement) = server.next_message().await;
        assert_eq!(
            movement,
            json!({"action": "move", "player_id": "p1", "direction": "UP"})
        );

        // Window closes with keys still held: STOP is the very next frame.
        client.handle_event(ClientEvent::Unload);
        let (_, stop) = server.next_message().await;
        assert_eq!(
            stop,
            json!({"action": "move", "player_id": "p1", "direction": "STOP"})
        );

        client.connection_mut().flush(WAIT).await;
        assert_eq!(client.connection().state(), ConnectionState::Closed);
        assert!(!client.connection().send_intent(Direction::Down));
    }

    /// A server-side close is terminal and silences the client.
    #[tokio::test]
    async fn server_close_is_terminal() {
        let mut script = Script::joined(vec![json!({"status": "game_starting"})]);
        script.close_after_frames = true;
        let mut server = MockServer::start(script).await;

        let (connection, mut events) = connect(&server).await;
        server.next_message().await;

        let mut client = Client::new(connection, RecordingRenderer::default());
        loop {
            let event = next_event(&mut events).await;
            let closed = matches!(event, ClientEvent::Closed { .. });
            if closed {
                assert_eq!(
                    event,
                    ClientEvent::Closed {
                        reason: Some("match over".to_string())
                    }
                );
            }
            client.handle_event(event);
            if closed {
                break;
            }
        }

        assert_eq!(client.connection().state(), ConnectionState::Closed);
        assert_eq!(client.phase(), Phase::Disconnected);
        assert!(client.connection().handle().is_none());
        assert!(!client.tracker().is_listening());

        client.handle_event(press("KeyS"));
        assert!(!client.connection().send_intent(Direction::Down));
    }
}

/// STATE SYNC TESTS
mod state_sync_tests {
    use super::*;

    /// Snapshots are applied in arrival order; bad frames never reach the model.
    #[tokio::test]
    async fn snapshots_render_in_order() {
        let frames = vec![
            json!({"status": "game_starting"}),
            json!({"status": "game_update", "state": {
                "players": {"player1": {"player_id": "p1", "x": 12, "y": 40, "score": 0}},
                "ball": {"x": 100, "y": 200}
            }}),
            json!("not an object"),
            json!({"status": "player_disconnect"}),
            json!({"status": "game_update", "state": {
                "players": {"player2": {"x": 676, "y": 10, "score": 5}}
            }}),
            json!({"status": "game_update", "state": {
                "players": {"player2": {"x": 676, "y": 300, "score": 1}},
                "ball": {"x": 110, "y": 210},
                "status": "finished"
            }}),
        ];
        let mut server = MockServer::start(Script::joined(frames)).await;
        let (connection, mut events) = connect(&server).await;
        server.next_message().await;

        let mut client = Client::new(connection, RecordingRenderer::default());

        // The non-object frame is dropped by the reader; five events remain.
        for _ in 0..5 {
            let event = next_event(&mut events).await;
            client.handle_event(event);
        }

        let frames = &client.renderer().frames;
        assert_eq!(frames.len(), 2);

        let initial = RenderModel::new();
        assert_eq!(frames[0].left.y, 40.0);
        assert_eq!(frames[0].right, initial.right);
        assert_eq!(frames[0].ball.x, 100.0);

        // Left paddle survives the right-only update.
        assert_eq!(frames[1].left, frames[0].left);
        assert_eq!(frames[1].right.score, 1);
        assert_eq!(frames[1].right.y, 300.0);
        assert_eq!(frames[1].ball.y, 210.0);
        assert_eq!(client.model(), &frames[1]);
        assert_eq!(
            client.overlay(),
            pong_client::rendering::Overlay::GameOver
        );
    }
}

/// JOIN FAILURE TESTS
mod join_failure_tests {
    use super::*;

    async fn join_with(script: Script) -> JoinFailure {
        let server = MockServer::start(script).await;
        let config = server.config();
        let broker = SessionBroker::new(config.join_url().unwrap(), config.join_timeout).unwrap();
        assert_err!(broker.join_match().await)
    }

    #[tokio::test]
    async fn missing_player_id_is_join_failure() {
        let err = join_with(Script::join_reply(
            StatusCode::OK,
            r#"{"game_key":"abc"}"#,
        ))
        .await;
        assert!(matches!(err, JoinFailure::MissingField("player_id")));
    }

    #[tokio::test]
    async fn error_status_is_join_failure() {
        let err = join_with(Script::join_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"game_key":"abc","player_id":"p1"}"#,
        ))
        .await;
        assert!(matches!(err, JoinFailure::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn non_json_body_is_join_failure() {
        let err = join_with(Script::join_reply(StatusCode::OK, "<html>oops</html>")).await;
        assert!(matches!(err, JoinFailure::Decode(_)));
    }

    #[tokio::test]
    async fn camel_case_join_is_accepted() {
        let server = MockServer::start(Script::join_reply(
            StatusCode::OK,
            r#"{"gameKey":"xyz","playerId":"p2"}"#,
        ))
        .await;
        let config = server.config();
        let broker = SessionBroker::new(config.join_url().unwrap(), config.join_timeout).unwrap();

        let handle = assert_ok!(broker.join_match().await);
        assert_eq!(handle, SessionHandle::new("xyz", "p2"));
    }
}
