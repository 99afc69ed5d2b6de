use crate::error::MalformedSnapshot;
use crate::event::ClientEvent;
use crate::game::{RenderModel, StateSyncConsumer};
use crate::input::{InputIntentTracker, KeyEvent};
use crate::network::{ConnectionManager, ConnectionState};
use crate::rendering::{overlay_for, Overlay, Render};
use log::{debug, info, warn};
use shared::{ServerMessage, Snapshot};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForStart,
    Playing,
    Disconnected,
}

/// Single consumer of the event queue. Owns the connection, the intent
/// tracker and the render model; nothing else mutates them.
pub struct Client<R: Render> {
    connection: ConnectionManager,
    tracker: InputIntentTracker,
    sync: StateSyncConsumer,
    renderer: R,
    started: bool,
}

impl<R: Render> Client<R> {
    pub fn new(connection: ConnectionManager, renderer: R) -> Self {
        Self {
            connection,
            tracker: InputIntentTracker::new(),
            sync: StateSyncConsumer::new(),
            renderer,
            started: false,
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager {
        &mut self.connection
    }

    pub fn tracker(&self) -> &InputIntentTracker {
        &self.tracker
    }

    pub fn model(&self) -> &RenderModel {
        self.sync.model()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn phase(&self) -> Phase {
        if self.connection.state().is_terminal() {
            Phase::Disconnected
        } else if self.started {
            Phase::Playing
        } else {
            Phase::WaitingForStart
        }
    }

    pub fn overlay(&self) -> Overlay {
        overlay_for(self.sync.model(), self.started, self.connection.state())
    }

    /// Applies every event currently queued, in order. Returns how many.
    pub fn drain(&mut self, queue: &mut mpsc::UnboundedReceiver<ClientEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = queue.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: ClientEvent) {
        let was_terminal = self.connection.state().is_terminal();

        match event {
            ClientEvent::Key(key) => self.handle_key(key),
            ClientEvent::Server(message) => self.handle_message(message),
            ClientEvent::Closed { reason } => {
                self.connection.mark_closed(reason.as_deref());
                self.tracker.detach();
            }
            ClientEvent::Failed { reason } => {
                self.connection.mark_failed(&reason);
                self.tracker.detach();
            }
            ClientEvent::Unload => {
                self.connection.close();
                self.tracker.detach();
            }
        }

        if !was_terminal && self.connection.state().is_terminal() {
            info!(
                "Session ended: {} snapshots applied, {} dropped",
                self.sync.applied(),
                self.sync.rejected()
            );
        }
    }

    pub fn sync(&self) -> &StateSyncConsumer {
        &self.sync
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(direction) = self.tracker.handle(key) {
            if !self.connection.send_intent(direction) {
                debug!("Intent {:?} not sent", direction);
            }
        }
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::GameStarting => self.start(),
            ServerMessage::GameUpdate { state: Some(snapshot) } => self.apply(&snapshot),
            ServerMessage::GameUpdate { state: None } => {
                self.sync.reject(MalformedSnapshot::MissingState);
            }
            ServerMessage::Error { message } => warn!("Server error: {}", message),
            ServerMessage::Unknown => debug!("Ignoring unknown server message"),
        }
    }

    fn start(&mut self) {
        if self.connection.state() != ConnectionState::Open {
            debug!("Start signal after connection left Open, ignoring");
            return;
        }
        if self.started {
            return;
        }

        info!("Game is starting!");
        self.started = true;
        self.tracker.attach();
    }

    fn apply(&mut self, snapshot: &Snapshot) {
        if let Ok(model) = self.sync.apply(snapshot) {
            self.renderer.render(model);
        }
    }
}
