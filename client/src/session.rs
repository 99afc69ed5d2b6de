//! Match join request resolving this client's seat

use crate::error::JoinFailure;
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Identifies this client's seat in a match. Immutable once obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    game_key: String,
    player_id: String,
}

impl SessionHandle {
    pub fn new(game_key: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            game_key: game_key.into(),
            player_id: player_id.into(),
        }
    }

    pub fn game_key(&self) -> &str {
        &self.game_key
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }
}

#[derive(Debug, Deserialize)]
struct JoinResponse {
    #[serde(default, alias = "gameKey")]
    game_key: Option<String>,
    #[serde(default, alias = "playerId")]
    player_id: Option<String>,
}

impl JoinResponse {
    fn into_handle(self) -> Result<SessionHandle, JoinFailure> {
        let game_key = non_empty(self.game_key).ok_or(JoinFailure::MissingField("game_key"))?;
        let player_id =
            non_empty(self.player_id).ok_or(JoinFailure::MissingField("player_id"))?;
        Ok(SessionHandle {
            game_key,
            player_id,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Single request/response call against the matchmaking endpoint.
pub struct SessionBroker {
    http: reqwest::Client,
    join_url: Url,
}

impl SessionBroker {
    pub fn new(join_url: Url, timeout: Duration) -> Result<Self, JoinFailure> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(JoinFailure::ClientBuild)?;

        Ok(Self { http, join_url })
    }

    pub fn join_url(&self) -> &Url {
        &self.join_url
    }

    pub async fn join_match(&self) -> Result<SessionHandle, JoinFailure> {
        info!("Joining match via {}", self.join_url);

        let response = self.http.get(self.join_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JoinFailure::Status(status));
        }

        let body: JoinResponse = response.json().await?;
        debug!("Join response: {:?}", body);

        let handle = body.into_handle()?;
        info!(
            "Joined game {} as player {}",
            handle.game_key(),
            handle.player_id()
        );
        Ok(handle)
    }
}
