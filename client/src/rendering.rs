use crate::game::RenderModel;
use crate::network::ConnectionState;
use macroquad::prelude::*;
use shared::{MatchStatus, BALL_SIDE, BOARD_HEIGHT, BOARD_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH};

/// Receives the render model after every accepted snapshot.
pub trait Render {
    fn render(&mut self, model: &RenderModel);
}

/// What the player should be told on top of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    WaitingForOpponent,
    GameOver,
    Disconnected,
    /// Startup could not complete (join, handshake or configuration).
    Failed(String),
}

impl Overlay {
    pub fn text(&self) -> Option<&str> {
        match self {
            Overlay::None => None,
            Overlay::WaitingForOpponent => Some("Waiting for opponent..."),
            Overlay::GameOver => Some("Game over"),
            Overlay::Disconnected => Some("Disconnected"),
            Overlay::Failed(reason) => Some(reason.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameConfig {
    pub overlay: Overlay,
    pub connection: Option<ConnectionState>,
}

/// Window renderer. Keeps the last model it was handed and paints it
/// every frame, so a dead connection leaves the last frame on screen.
pub struct Renderer {
    model: RenderModel,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            model: RenderModel::new(),
        }
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn draw(&self, config: &FrameConfig) {
        clear_background(BLACK);

        self.draw_center_line();
        self.draw_ball();
        self.draw_scores();
        self.draw_paddles();

        if let Some(text) = config.overlay.text() {
            self.draw_overlay(text);
        }
        self.draw_connection(config.connection);
    }

    fn draw_center_line(&self) {
        let x = BOARD_WIDTH / 2.0 - 5.0;
        let mut y = 10.0;
        while y < BOARD_HEIGHT {
            draw_rectangle(x, y, 5.0, 5.0, WHITE);
            y += 25.0;
        }
    }

    fn draw_ball(&self) {
        let ball = &self.model.ball;
        draw_rectangle(ball.x, ball.y, BALL_SIDE, BALL_SIDE, WHITE);
    }

    fn draw_paddles(&self) {
        for paddle in [&self.model.left, &self.model.right] {
            draw_rectangle(paddle.x, paddle.y, PADDLE_WIDTH, PADDLE_HEIGHT, WHITE);
        }
    }

    fn draw_scores(&self) {
        let (left, right) = score_labels(&self.model);
        draw_text(&left, 140.0, 45.0, 45.0, WHITE);
        draw_text(&right, 490.0, 45.0, 45.0, WHITE);
    }

    fn draw_overlay(&self, text: &str) {
        let font_size = 32.0;
        let dims = measure_text(text, None, font_size as u16, 1.0);
        let x = (BOARD_WIDTH - dims.width) / 2.0;
        let y = BOARD_HEIGHT / 2.0 + 60.0;

        draw_rectangle(
            x - 10.0,
            y - dims.offset_y - 8.0,
            dims.width + 20.0,
            dims.height + 16.0,
            Color::from_rgba(26, 26, 26, 220),
        );
        draw_text(text, x, y, font_size, Color::from_rgba(255, 140, 0, 255));
    }

    fn draw_connection(&self, state: Option<ConnectionState>) {
        let color = match state {
            Some(ConnectionState::Open) => GREEN,
            Some(ConnectionState::Connecting) => YELLOW,
            Some(ConnectionState::Closed) | Some(ConnectionState::Failed) | None => RED,
        };
        let y = BOARD_HEIGHT - 18.0;
        draw_rectangle(10.0, y, 8.0, 8.0, color);
        draw_text("CON", 20.0, y + 8.0, 12.0, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for Renderer {
    fn render(&mut self, model: &RenderModel) {
        self.model = model.clone();
    }
}

fn score_labels(model: &RenderModel) -> (String, String) {
    (model.left.score.to_string(), model.right.score.to_string())
}

/// Picks the overlay for the current match state.
pub fn overlay_for(model: &RenderModel, started: bool, connection: ConnectionState) -> Overlay {
    if model.status == Some(MatchStatus::Finished) {
        Overlay::GameOver
    } else if connection.is_terminal() {
        Overlay::Disconnected
    } else if !started {
        Overlay::WaitingForOpponent
    } else {
        Overlay::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_latest_model() {
        let mut renderer = Renderer::new();
        let mut model = RenderModel::new();
        model.left.score = 2;
        model.ball.x = 10.0;

        renderer.render(&model);

        assert_eq!(renderer.model(), &model);
    }

    #[test]
    fn test_score_labels() {
        let mut model = RenderModel::new();
        model.left.score = 3;
        model.right.score = 11;
        assert_eq!(score_labels(&model), ("3".to_string(), "11".to_string()));
    }

    #[test]
    fn test_overlay_selection() {
        let mut model = RenderModel::new();
        assert_eq!(
            overlay_for(&model, false, ConnectionState::Open),
            Overlay::WaitingForOpponent
        );
        assert_eq!(overlay_for(&model, true, ConnectionState::Open), Overlay::None);
        assert_eq!(
            overlay_for(&model, true, ConnectionState::Failed),
            Overlay::Disconnected
        );

        model.status = Some(MatchStatus::Finished);
        assert_eq!(
            overlay_for(&model, true, ConnectionState::Closed),
            Overlay::GameOver
        );
    }

    #[test]
    fn test_overlay_text() {
        assert_eq!(Overlay::None.text(), None);
        assert_eq!(
            Overlay::Failed("websocket handshake timed out after 5s".to_string()).text(),
            Some("websocket handshake timed out after 5s")
        );
    }
}
