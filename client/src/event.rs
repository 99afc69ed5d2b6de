use crate::input::KeyEvent;
use shared::ServerMessage;

/// Everything the dispatcher reacts to, delivered through one ordered queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Key(KeyEvent),
    Server(ServerMessage),
    /// Remote side closed the socket or the stream ended.
    Closed { reason: Option<String> },
    /// Transport error on an open socket.
    Failed { reason: String },
    /// Window is going away.
    Unload,
}
