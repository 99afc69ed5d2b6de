use crate::network::ConnectionState;
use std::time::Duration;
use thiserror::Error;

/// Session acquisition failed. Fatal to startup; never retried.
#[derive(Debug, Error)]
pub enum JoinFailure {
    #[error("join request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("join request timed out")]
    Timeout,

    #[error("join endpoint answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("join response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("join response is missing `{0}`")]
    MissingField(&'static str),

    #[error("could not build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl From<reqwest::Error> for JoinFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JoinFailure::Timeout
        } else if err.is_decode() {
            JoinFailure::Decode(err)
        } else {
            JoinFailure::Request(err)
        }
    }
}

/// Handshake or transport error. Terminal; the user has to restart.
#[derive(Debug, Error)]
pub enum ConnectionFailure {
    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("websocket handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("cannot connect from the {0:?} state")]
    InvalidState(ConnectionState),
}

/// Reasons a snapshot is dropped without touching the render model.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedSnapshot {
    #[error("game update carried no state")]
    MissingState,

    #[error("snapshot has no players section")]
    MissingPlayers,

    #[error("snapshot has no ball section")]
    MissingBall,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Join(#[from] JoinFailure),

    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start network runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
