//! # Pong Client Library
//!
//! Client side of a server-authoritative two-player paddle game. The server
//! computes all physics and scoring; this crate joins a match, keeps one
//! websocket open to it, turns keyboard input into a minimal stream of
//! directional intents and draws the snapshots the server pushes back.
//!
//! ## Architecture Overview
//!
//! Every input to the client (key transitions, decoded server frames,
//! socket closure and window close) becomes a [`event::ClientEvent`] on a
//! single ordered queue. [`client::Client`] drains that queue on the frame
//! thread and is the only owner of the state machines below, so there is
//! no shared mutable state between tasks.
//!
//! ### Session Module (`session`)
//! One HTTP request against the join endpoint producing a
//! [`session::SessionHandle`] (game key and player id). No retry.
//!
//! ### Network Module (`network`)
//! [`network::ConnectionManager`] owns the websocket for one session:
//! - `Connecting → Open → Closed | Failed`, terminal states are sticky
//! - announces readiness as soon as the socket opens
//! - `send` outside `Open` is a silent no-op
//! - a local close sends a best-effort STOP before the close frame
//!
//! ### Input Module (`input`)
//! [`input::InputIntentTracker`] maps the four movement bindings (W/S and
//! the arrow keys) to a single UP/DOWN/STOP intent, resolving overlapping
//! presses and only reporting changes. Inert until the match starts.
//!
//! ### Game Module (`game`)
//! [`game::StateSyncConsumer`] validates snapshots and applies them to the
//! [`game::RenderModel`], one paddle side at a time.
//!
//! ### Rendering Module (`rendering`)
//! The [`rendering::Render`] seam plus the window renderer.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use pong_client::*;
//!
//! let broker = session::SessionBroker::new(config.join_url()?, config.join_timeout)?;
//! let handle = broker.join_match().await?;
//!
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut connection = network::ConnectionManager::new(handle.clone());
//! connection
//!     .connect(&config.game_url(handle.game_key())?, config.connect_timeout, events_tx.clone())
//!     .await?;
//!
//! let mut client = client::Client::new(connection, rendering::Renderer::new());
//! loop {
//!     for key in input::poll_keyboard() {
//!         events_tx.send(event::ClientEvent::Key(key))?;
//!     }
//!     client.drain(&mut events_rx);
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod session;
