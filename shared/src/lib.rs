use serde::{Deserialize, Serialize};

pub const BOARD_WIDTH: f32 = 700.0;
pub const BOARD_HEIGHT: f32 = 500.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 50.0;
pub const BALL_SIDE: f32 = 10.0;

/// Gap between a paddle and its side wall in the server's default layout.
pub const PADDLE_MARGIN: f32 = BALL_SIDE * 1.2;

/// Directional intent reported to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Stop,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Stop => Direction::Stop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Ready {
        player_id: String,
    },
    Move {
        player_id: String,
        direction: Direction,
    },
}

impl ClientMessage {
    pub fn ready(player_id: impl Into<String>) -> Self {
        Self::Ready {
            player_id: player_id.into(),
        }
    }

    pub fn movement(player_id: impl Into<String>, direction: Direction) -> Self {
        Self::Move {
            player_id: player_id.into(),
            direction,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerMessage {
    GameStarting,
    GameUpdate {
        #[serde(default)]
        state: Option<Snapshot>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Decodes one text frame. Frames that are not JSON objects with a
    /// `status` tag, or whose known payload has the wrong shape, fail here.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Authoritative description of the match pushed by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Players>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<BallState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Players {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1: Option<PaddleState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2: Option<PaddleState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleState {
    pub x: f32,
    pub y: f32,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Finished,
    #[serde(other)]
    Unknown,
}
