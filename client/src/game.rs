use crate::error::MalformedSnapshot;
use log::debug;
use shared::{
    BallState, MatchStatus, PaddleState, Snapshot, BALL_SIDE, BOARD_HEIGHT, BOARD_WIDTH,
    PADDLE_HEIGHT, PADDLE_MARGIN,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub score: u32,
}

impl From<PaddleState> for Paddle {
    fn from(state: PaddleState) -> Self {
        Self {
            x: state.x,
            y: state.y,
            score: state.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
}

impl From<BallState> for Ball {
    fn from(state: BallState) -> Self {
        Self {
            x: state.x,
            y: state.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    pub status: Option<MatchStatus>,
}

impl RenderModel {
    /// The server's layout before the first update arrives.
    pub fn new() -> Self {
        let paddle_y = BOARD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;
        Self {
            left: Paddle {
                x: PADDLE_MARGIN,
                y: paddle_y,
                score: 0,
            },
            right: Paddle {
                x: BOARD_WIDTH - 2.0 * PADDLE_MARGIN,
                y: paddle_y,
                score: 0,
            },
            ball: Ball {
                x: BOARD_WIDTH / 2.0 - BALL_SIDE / 2.0,
                y: BOARD_HEIGHT / 2.0 - BALL_SIDE / 2.0,
            },
            status: None,
        }
    }
}

impl Default for RenderModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies authoritative snapshots to the local render model.
pub struct StateSyncConsumer {
    model: RenderModel,
    applied: u64,
    rejected: u64,
}

impl StateSyncConsumer {
    pub fn new() -> Self {
        Self {
            model: RenderModel::new(),
            applied: 0,
            rejected: 0,
        }
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Validates and applies one snapshot. A snapshot needs both a players
    /// and a ball section; each paddle present replaces that side wholesale,
    /// an absent side keeps its last known values.
    pub fn apply(&mut self, snapshot: &Snapshot) -> Result<&RenderModel, MalformedSnapshot> {
        let (players, ball) = match (&snapshot.players, &snapshot.ball) {
            (Some(players), Some(ball)) => (players, ball),
            (None, _) => return Err(self.reject(MalformedSnapshot::MissingPlayers)),
            (_, None) => return Err(self.reject(MalformedSnapshot::MissingBall)),
        };

        if let Some(left) = players.player1 {
            self.model.left = left.into();
        }
        if let Some(right) = players.player2 {
            self.model.right = right.into();
        }
        self.model.ball = (*ball).into();

        if let Some(status) = snapshot.status {
            self.model.status = Some(status);
        }

        self.applied += 1;
        Ok(&self.model)
    }

    /// Records a dropped update; the model stays as it was.
    pub fn reject(&mut self, reason: MalformedSnapshot) -> MalformedSnapshot {
        debug!("Dropping snapshot: {}", reason);
        self.rejected += 1;
        reason
    }
}

impl Default for StateSyncConsumer {
    fn default() -> Self {
        Self::new()
    }
}
