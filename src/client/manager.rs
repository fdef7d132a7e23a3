//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] owns the one live transport handle, the session and
//! the pending retry. Every transition happens inside one of its methods,
//! which the client event loop calls one at a time:
//!
//! | Input | Method |
//! |-------|--------|
//! | First load / host request | [`connect`](ConnectionManager::connect) |
//! | Transport notice | [`handle_notice`](ConnectionManager::handle_notice) |
//! | Retry timer fired | [`handle_retry_due`](ConnectionManager::handle_retry_due) |
//! | User input | [`send`](ConnectionManager::send) |
//! | Page became visible | [`force_reconnect`](ConnectionManager::force_reconnect) |
//!
//! # Transitions
//!
//! ```text
//!                 connect()
//! Disconnected ─────────────► Connecting ──Opened──► Connected
//!      ▲  ▲                       │                      │
//!      │  └──── open failed ──────┘                      │
//!      └──────────────── Closed ◄────────────────────────┘
//!                  (retry after interval while attempts < max)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::identifiers::{Generation, RetryTicket};
use crate::protocol::DisplayRecord;
use crate::router::MessageRouter;
use crate::session::{Session, SharedIdentity};
use crate::transport::{EventSender, Transport, TransportEvent, TransportHandle, TransportNotice};

use super::config::ClientConfig;
use super::retry::{ReconnectPolicy, ScheduledRetry, Scheduler};
use super::sink::PresentationSink;
use super::state::{
    ConnectionState, STATUS_CONNECTED, STATUS_CONNECTING, STATUS_DISCONNECTED, STATUS_FAILED,
    StatusUpdate,
};

// ============================================================================
// System Messages
// ============================================================================

/// Shown when a handle opens.
pub const MSG_CONNECTED: &str = "Connected to chat server";

/// Shown when a handle closes.
pub const MSG_DISCONNECTED: &str = "Disconnected from chat server";

/// Shown for every transport error.
pub const MSG_ERROR: &str = "Connection error occurred";

/// Shown when the transport refuses to open a handle.
pub const MSG_OPEN_FAILED: &str = "Failed to connect to server";

// ============================================================================
// ManagerParts
// ============================================================================

/// Collaborators injected into a [`ConnectionManager`].
pub struct ManagerParts {
    /// Display name source, asked once.
    pub identity: SharedIdentity,
    /// Opens transport handles.
    pub transport: Box<dyn Transport>,
    /// Fires retry tickets.
    pub scheduler: Box<dyn Scheduler>,
    /// Receives records and status updates.
    pub sink: Box<dyn PresentationSink>,
    /// Channel transport handles report into.
    pub notices: mpsc::UnboundedSender<TransportNotice>,
}

// ============================================================================
// LiveHandle
// ============================================================================

/// The current transport handle and its generation.
struct LiveHandle {
    generation: Generation,
    handle: Box<dyn TransportHandle>,
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the connection lifecycle.
pub struct ConnectionManager {
    /// Chat server endpoint.
    endpoint: Url,
    /// Reconnection policy.
    policy: ReconnectPolicy,

    /// Display name source.
    identity: SharedIdentity,
    /// Opens handles.
    transport: Box<dyn Transport>,
    /// Fires retry tickets.
    scheduler: Box<dyn Scheduler>,
    /// Presentation output.
    sink: Box<dyn PresentationSink>,
    /// Notice channel handed to each new handle.
    notices: mpsc::UnboundedSender<TransportNotice>,

    /// Created on first connect.
    session: Option<Session>,
    /// Built together with the session.
    router: Option<MessageRouter>,
    /// Current state.
    state: ConnectionState,
    /// Copy of `state` readable from other tasks.
    published: Arc<RwLock<ConnectionState>>,
    /// At most one live handle.
    live: Option<LiveHandle>,
    /// Last generation handed out.
    generation: Generation,
    /// Reconnect waiting for its timer.
    pending_retry: Option<ScheduledRetry>,
    /// Last retry ticket handed out.
    ticket: RetryTicket,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint.as_str())
            .field("state", &self.state)
            .field("session", &self.session)
            .field("live_generation", &self.live_generation())
            .field("pending_retry", &self.pending_retry)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ConnectionManager - Public API
// ============================================================================

impl ConnectionManager {
    /// Creates a disconnected manager.
    #[must_use]
    pub fn new(config: &ClientConfig, parts: ManagerParts) -> Self {
        Self {
            endpoint: config.endpoint().clone(),
            policy: config.policy(),
            identity: parts.identity,
            transport: parts.transport,
            scheduler: parts.scheduler,
            sink: parts.sink,
            notices: parts.notices,
            session: None,
            router: None,
            state: ConnectionState::Disconnected,
            published: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            live: None,
            generation: Generation::default(),
            pending_retry: None,
            ticket: RetryTicket::default(),
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns a shared cell that always holds the current state.
    ///
    /// Updated on every transition, including while `connect` is still
    /// waiting on the identity provider.
    #[inline]
    #[must_use]
    pub fn state_cell(&self) -> Arc<RwLock<ConnectionState>> {
        Arc::clone(&self.published)
    }

    /// Returns the session, once the first connect resolved it.
    #[inline]
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the display name, once resolved.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.session.as_ref().map(Session::display_name)
    }

    /// Returns the automatic reconnect attempts since the last open.
    #[inline]
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.session.as_ref().map_or(0, Session::attempt_count)
    }

    /// Returns the generation of the live handle, if any.
    #[inline]
    #[must_use]
    pub fn live_generation(&self) -> Option<Generation> {
        self.live.as_ref().map(|live| live.generation)
    }

    /// Returns `true` while a reconnect waits for its timer.
    #[inline]
    #[must_use]
    pub const fn has_pending_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    /// Returns the chat server endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Opens a new handle unless already connected.
    ///
    /// Cancels any pending retry and closes a handle that is still opening,
    /// so at most one handle is ever live. The identity provider is asked on
    /// the first call only.
    pub async fn connect(&mut self) {
        if self.state.is_connected() {
            debug!("Already connected, ignoring connect");
            return;
        }

        self.cancel_pending_retry();
        self.close_live_handle();
        self.set_state(ConnectionState::Connecting, STATUS_CONNECTING);
        self.ensure_session().await;

        self.generation = self.generation.next();
        let generation = self.generation;
        let events = EventSender::new(generation, self.notices.clone());

        match self.transport.open(&self.endpoint, events) {
            Ok(handle) => {
                debug!(url = %self.endpoint, %generation, "Transport handle opening");
                self.live = Some(LiveHandle { generation, handle });
            }
            Err(e) => {
                error!(url = %self.endpoint, error = %e, "Connection error");
                self.set_state(ConnectionState::Disconnected, STATUS_FAILED);
                self.sink.display(DisplayRecord::system(MSG_OPEN_FAILED));
            }
        }
    }

    /// Sends a chat line.
    ///
    /// Returns `false` without touching the wire when not connected or when
    /// `text` is blank. Otherwise `text` goes out unchanged.
    pub fn send(&mut self, text: &str) -> bool {
        if !self.state.is_connected() || text.trim().is_empty() {
            trace!(state = %self.state, "Send ignored");
            return false;
        }

        let Some(live) = self.live.as_mut() else {
            return false;
        };

        match live.handle.send(text) {
            Ok(()) => {
                trace!(generation = %live.generation, "Message sent");
                true
            }
            Err(e) => {
                warn!(generation = %live.generation, error = %e, "Failed to send message");
                false
            }
        }
    }

    /// Recovers immediately when not connected.
    ///
    /// Resets the attempt counter, so this also works after automatic
    /// retries are exhausted.
    pub async fn force_reconnect(&mut self) {
        if self.state.is_connected() {
            trace!("Connected, ignoring reconnect trigger");
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.reset_attempts();
        }

        info!("Reconnect triggered");
        self.connect().await;
    }

    /// Applies one transport notice.
    ///
    /// Notices from any handle other than the live one are discarded.
    pub fn handle_notice(&mut self, notice: TransportNotice) {
        let TransportNotice { generation, event } = notice;

        if self.live_generation() != Some(generation) {
            trace!(%generation, ?event, "Discarding stale transport notice");
            return;
        }

        match event {
            TransportEvent::Opened => self.on_opened(),
            TransportEvent::Closed => self.on_closed(),
            TransportEvent::Error(message) => self.on_error(&message),
            TransportEvent::Message(frame) => self.on_message(&frame),
        }
    }

    /// Runs the reconnect behind `ticket`.
    ///
    /// Ignored unless `ticket` is the pending retry.
    pub async fn handle_retry_due(&mut self, ticket: RetryTicket) {
        if self.pending_retry.as_ref().map(ScheduledRetry::ticket) != Some(ticket) {
            trace!(%ticket, "Discarding stale retry");
            return;
        }
        self.pending_retry = None;

        let attempt = self
            .session
            .as_mut()
            .map_or(0, |session| session.record_attempt());
        info!(
            attempt,
            max = self.policy.max_attempts,
            "Attempting to reconnect ({attempt}/{})...",
            self.policy.max_attempts
        );

        self.connect().await;
    }

    /// Closes the live handle and cancels any pending retry.
    pub fn shutdown(&mut self) {
        self.cancel_pending_retry();
        self.close_live_handle();

        if self.state != ConnectionState::Disconnected {
            self.set_state(ConnectionState::Disconnected, STATUS_DISCONNECTED);
        }

        debug!("Connection manager shut down");
    }
}

// ============================================================================
// ConnectionManager - Transitions
// ============================================================================

impl ConnectionManager {
    fn on_opened(&mut self) {
        self.set_state(ConnectionState::Connected, STATUS_CONNECTED);
        self.sink.display(DisplayRecord::system(MSG_CONNECTED));

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.reset_attempts();
        info!(display_name = %session.display_name(), "Connected to chat server");

        // Registration: the first frame binds this connection to our name
        if let Some(live) = self.live.as_mut()
            && let Err(e) = live.handle.send(session.display_name())
        {
            warn!(generation = %live.generation, error = %e, "Failed to send registration");
        }
    }

    fn on_closed(&mut self) {
        self.live = None;

        if self.state == ConnectionState::Disconnected {
            return;
        }

        info!("Disconnected from server");
        self.set_state(ConnectionState::Disconnected, STATUS_DISCONNECTED);
        self.sink.display(DisplayRecord::system(MSG_DISCONNECTED));
        self.schedule_retry();
    }

    fn on_error(&mut self, message: &str) {
        warn!(error = message, "WebSocket error");
        self.sink.display(DisplayRecord::system(MSG_ERROR));
    }

    fn on_message(&mut self, frame: &str) {
        trace!(len = frame.len(), "Received message");

        let record = match &self.router {
            Some(router) => router.route(frame),
            None => DisplayRecord::system(frame),
        };
        self.sink.display(record);
    }
}

// ============================================================================
// ConnectionManager - Helpers
// ============================================================================

impl ConnectionManager {
    async fn ensure_session(&mut self) {
        if self.session.is_some() {
            return;
        }

        let session = Session::resolve(self.identity.as_ref()).await;
        info!(display_name = %session.display_name(), "Session created");

        self.router = Some(MessageRouter::new(session.display_name()));
        self.session = Some(session);
    }

    fn schedule_retry(&mut self) {
        if self.live.is_some() || self.pending_retry.is_some() {
            debug!("Handle live or retry pending, not scheduling");
            return;
        }

        let attempts = self.attempt_count();
        if !self.policy.allows(attempts) {
            info!(
                attempts,
                max = self.policy.max_attempts,
                "Reconnect attempts exhausted"
            );
            return;
        }

        self.ticket = self.ticket.next();
        let retry = self.scheduler.schedule(self.policy.interval, self.ticket);
        debug!(
            ticket = %self.ticket,
            delay = ?self.policy.interval,
            "Reconnect scheduled"
        );
        self.pending_retry = Some(retry);
    }

    fn cancel_pending_retry(&mut self) {
        if let Some(retry) = self.pending_retry.take() {
            retry.cancel();
        }
    }

    fn close_live_handle(&mut self) {
        if let Some(mut live) = self.live.take() {
            debug!(generation = %live.generation, "Closing transport handle");
            live.handle.close();
        }
    }

    fn set_state(&mut self, state: ConnectionState, text: &str) {
        debug!(from = %self.state, to = %state, status = text, "State transition");
        self.state = state;
        *self.published.write() = state;
        self.sink.status(StatusUpdate::new(state, text));
    }
}

// ============================================================================
// Tests
// ============================================================================
