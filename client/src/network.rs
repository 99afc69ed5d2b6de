//! Websocket connection lifecycle for one match session

use crate::error::ConnectionFailure;
use crate::event::ClientEvent;
use crate::session::SessionHandle;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use reqwest::Url;
use shared::{ClientMessage, Direction, ServerMessage};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of the single connection owned by a session.
/// `Closed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

pub struct ConnectionManager {
    handle: Option<SessionHandle>,
    state: ConnectionState,
    outgoing: Option<mpsc::UnboundedSender<ClientMessage>>,
    writer: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            handle: Some(handle),
            state: ConnectionState::Connecting,
            outgoing: None,
            writer: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// The session handle, until the connection reaches a terminal state.
    pub fn handle(&self) -> Option<&SessionHandle> {
        self.handle.as_ref()
    }

    /// Performs the websocket handshake and starts the socket tasks.
    /// Inbound frames are decoded and pushed onto `events` in arrival order.
    pub async fn connect(
        &mut self,
        url: &Url,
        timeout: Duration,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Result<(), ConnectionFailure> {
        if self.state != ConnectionState::Connecting {
            return Err(ConnectionFailure::InvalidState(self.state));
        }

        info!("Connecting to {}...", url);

        let ws_stream = match tokio::time::timeout(timeout, connect_async(url.as_str())).await {
            Ok(Ok((ws_stream, _response))) => ws_stream,
            Ok(Err(e)) => {
                self.fail();
                return Err(ConnectionFailure::Handshake(e));
            }
            Err(_) => {
                self.fail();
                return Err(ConnectionFailure::Timeout(timeout));
            }
        };

        let (sink, stream) = ws_stream.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        self.writer = Some(tokio::spawn(write_loop(sink, outgoing_rx)));
        tokio::spawn(read_loop(stream, events));

        self.attach(outgoing_tx);
        Ok(())
    }

    /// Binds an established outbound queue, enters `Open` and announces
    /// readiness with the participant id.
    pub fn attach(&mut self, outgoing: mpsc::UnboundedSender<ClientMessage>) {
        if self.state != ConnectionState::Connecting {
            warn!("Ignoring attach in {:?} state", self.state);
            return;
        }

        self.outgoing = Some(outgoing);
        self.state = ConnectionState::Open;

        match &self.handle {
            Some(handle) => {
                info!("Connection open for game {}", handle.game_key());
                let ready = ClientMessage::ready(handle.player_id());
                self.send(ready);
            }
            None => warn!("Connection opened without a session handle"),
        }
    }

    /// Queues a message for the writer. Outside `Open` this does nothing.
    /// Returns whether the message was queued.
    pub fn send(&self, message: ClientMessage) -> bool {
        if self.state != ConnectionState::Open {
            debug!("Dropping {:?} in {:?} state", message, self.state);
            return false;
        }

        match &self.outgoing {
            Some(tx) => match tx.send(message) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Writer gone, dropping {:?}", e.0);
                    false
                }
            },
            None => false,
        }
    }

    pub fn send_intent(&self, direction: Direction) -> bool {
        match &self.handle {
            Some(handle) => self.send(ClientMessage::movement(handle.player_id(), direction)),
            None => false,
        }
    }

    /// Local close. Sends STOP first while the socket is still writable,
    /// then releases the outbound queue so the writer sends a close frame.
    pub fn close(&mut self) {
        match self.state {
            ConnectionState::Closed | ConnectionState::Failed => return,
            ConnectionState::Open => {
                self.send_intent(Direction::Stop);
            }
            ConnectionState::Connecting => {}
        }

        info!("Closing connection");
        self.outgoing = None;
        self.handle = None;
        self.state = ConnectionState::Closed;
    }

    /// Remote close. Nothing is written since the peer is gone.
    pub fn mark_closed(&mut self, reason: Option<&str>) {
        if self.state.is_terminal() {
            return;
        }

        match reason {
            Some(reason) => info!("Connection closed by server: {}", reason),
            None => info!("Connection closed by server"),
        }
        self.outgoing = None;
        self.handle = None;
        self.state = ConnectionState::Closed;
    }

    pub fn mark_failed(&mut self, reason: &str) {
        if self.state.is_terminal() {
            return;
        }

        error!("Connection failed: {}", reason);
        self.fail();
    }

    fn fail(&mut self) {
        self.outgoing = None;
        self.handle = None;
        self.state = ConnectionState::Failed;
    }

    /// Waits up to `grace` for queued frames and the close frame to go out.
    /// Only finishes early once the connection has been closed.
    pub async fn flush(&mut self, grace: Duration) {
        if let Some(writer) = self.writer.take() {
            if tokio::time::timeout(grace, writer).await.is_err() {
                warn!("Writer did not finish within {:?}", grace);
            }
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outgoing: mpsc::UnboundedReceiver<ClientMessage>,
) {
    while let Some(message) = outgoing.recv().await {
        let json = match message.encode() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode {:?}: {}", message, e);
                continue;
            }
        };

        debug!("Sending: {}", json);
        if let Err(e) = sink.send(Message::Text(json)).await {
            error!("Failed to send message: {}", e);
            return;
        }
    }

    if let Err(e) = sink.close().await {
        debug!("Close frame not delivered: {}", e);
    }
    debug!("Writer loop ended");
}

async fn read_loop(mut stream: SplitStream<WsStream>, events: mpsc::UnboundedSender<ClientEvent>) {
    while let Some(frame) = stream.next().await {
        let event = match frame {
            Ok(Message::Text(text)) => match ServerMessage::decode(&text) {
                Ok(message) => {
                    debug!("Received: {:?}", message);
                    ClientEvent::Server(message)
                }
                Err(e) => {
                    warn!("Dropping undecodable server message: {} - {}", e, text);
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|reason| !reason.is_empty());
                let _ = events.send(ClientEvent::Closed { reason });
                return;
            }
            Ok(_) => continue,
            Err(e) => {
                let _ = events.send(ClientEvent::Failed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        if events.send(event).is_err() {
            debug!("Event queue dropped, stopping reader");
            return;
        }
    }

    let _ = events.send(ClientEvent::Closed { reason: None });
}
