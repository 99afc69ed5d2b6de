use crate::error::ClientError;
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Match server base URL (join endpoint and game socket live under it)
    #[arg(short = 's', long, default_value = "http://localhost:8000")]
    pub server: String,

    /// Timeout for the whole join request in milliseconds
    #[arg(long, default_value = "5000")]
    pub join_timeout_ms: u64,

    /// Timeout for the websocket handshake in milliseconds
    #[arg(long, default_value = "5000")]
    pub connect_timeout_ms: u64,

    /// Time allowed on exit to flush the final STOP and close frame
    #[arg(long, default_value = "250")]
    pub shutdown_grace_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    pub join_timeout: Duration,
    pub connect_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Result<Self, ClientError> {
        let mut server = Url::parse(&args.server)
            .map_err(|e| ClientError::Config(format!("invalid server URL {:?}: {}", args.server, e)))?;

        if !matches!(server.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "server URL must be http or https, got {}",
                server.scheme()
            )));
        }

        // Relative joins below must append to the base path, not replace it.
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }

        Ok(Self {
            server,
            join_timeout: Duration::from_millis(args.join_timeout_ms),
            connect_timeout: Duration::from_millis(args.connect_timeout_ms),
            shutdown_grace: Duration::from_millis(args.shutdown_grace_ms),
        })
    }

    pub fn join_url(&self) -> Result<Url, ClientError> {
        self.server
            .join("match/join/")
            .map_err(|e| ClientError::Config(format!("cannot build join URL: {}", e)))
    }

    /// Socket endpoint for a match: `ws(s)://host/ws/game/{game_key}/`.
    pub fn game_url(&self, game_key: &str) -> Result<Url, ClientError> {
        let mut url = self
            .server
            .join(&format!("ws/game/{}/", game_key))
            .map_err(|e| ClientError::Config(format!("cannot build game URL: {}", e)))?;

        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::Config(format!("cannot switch {} to {}", url, scheme)))?;
        Ok(url)
    }
}
