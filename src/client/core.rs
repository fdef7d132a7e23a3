//! Chat client handle and event loop.
//!
//! [`ChatClient`] is a cheap, cloneable handle. All connection work happens in
//! one spawned task that owns the [`ConnectionManager`] and feeds it one input
//! at a time, so transitions never run concurrently.
//!
//! # Event Loop
//!
//! The task multiplexes three sources:
//!
//! - Transport notices from the live handle
//! - Fired retry tickets from the scheduler
//! - Commands from the handle (`send`, `connect`, `force_reconnect`, `shutdown`)
//!
//! # Example
//!
//! ```no_run
//! use chat_client::{ChatClient, ClientEvent};
//!
//! # async fn example() -> chat_client::Result<()> {
//! let (client, mut events) = ChatClient::builder()
//!     .page_url("http://localhost:3000/")
//!     .display_name("Alice")
//!     .start()?;
//!
//! client.send("hello")?;
//!
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::Record(record) = event {
//!         println!("[{}] {}", record.time_label(), record.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::RetryTicket;
use crate::transport::TransportNotice;

use super::builder::ClientBuilder;
use super::manager::ConnectionManager;
use super::state::ConnectionState;

// ============================================================================
// ClientCommand
// ============================================================================

/// Internal commands for the event loop.
#[derive(Debug)]
enum ClientCommand {
    /// Connect unless connected.
    Connect,
    /// Visibility trigger.
    ForceReconnect,
    /// Send a chat line.
    Send(String),
    /// Stop the loop.
    Shutdown,
}

// ============================================================================
// Inputs
// ============================================================================

/// Receivers the event loop drains.
pub(crate) struct LoopInputs {
    pub notices: mpsc::UnboundedReceiver<TransportNotice>,
    pub retries: mpsc::UnboundedReceiver<RetryTicket>,
}

// ============================================================================
// ChatClient
// ============================================================================

/// Handle to a running chat client.
///
/// # Thread Safety
///
/// `ChatClient` is `Send + Sync` and can be cloned freely. All operations
/// are non-blocking; they queue a command for the event loop.
#[derive(Clone)]
pub struct ChatClient {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    /// State cell written by the manager on every transition.
    state: Arc<RwLock<ConnectionState>>,
    /// Event loop task, taken on shutdown.
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Spawns the event loop and performs the initial connect.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(manager: ConnectionManager, inputs: LoopInputs) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = manager.state_cell();

        let task = tokio::spawn(run_event_loop(manager, inputs, command_rx));

        Self {
            command_tx,
            state,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Returns `true` if connected.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Queues a chat line.
    ///
    /// Blank lines and lines typed while disconnected are dropped silently by
    /// the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientStopped`] if the event loop has terminated.
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        self.command(ClientCommand::Send(text.into()))
    }

    /// Connects unless already connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientStopped`] if the event loop has terminated.
    pub fn connect(&self) -> Result<()> {
        self.command(ClientCommand::Connect)
    }

    /// Visibility trigger: reconnects now if not connected, resetting the
    /// attempt counter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientStopped`] if the event loop has terminated.
    pub fn force_reconnect(&self) -> Result<()> {
        self.command(ClientCommand::ForceReconnect)
    }

    /// Closes the connection and waits for the event loop to finish.
    ///
    /// Safe to call more than once and from several clones.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(ClientCommand::Shutdown);

        let task = self.task.lock().take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!(error = %e, "Event loop task failed");
        }
    }

    fn command(&self, command: ClientCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::ClientStopped)
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Feeds the manager one input at a time until shutdown.
async fn run_event_loop(
    mut manager: ConnectionManager,
    mut inputs: LoopInputs,
    mut command_rx: mpsc::UnboundedReceiver<ClientCommand>,
) {
    manager.connect().await;

    loop {
        tokio::select! {
            Some(notice) = inputs.notices.recv() => {
                manager.handle_notice(notice);
            }

            Some(ticket) = inputs.retries.recv() => {
                manager.handle_retry_due(ticket).await;
            }

            command = command_rx.recv() => {
                match command {
                    Some(ClientCommand::Connect) => manager.connect().await,
                    Some(ClientCommand::ForceReconnect) => manager.force_reconnect().await,
                    Some(ClientCommand::Send(text)) => {
                        manager.send(&text);
                    }
                    Some(ClientCommand::Shutdown) | None => {
                        debug!("Shutdown command received");
                        manager.shutdown();
                        break;
                    }
                }
            }
        }
    }

    debug!("Event loop terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::time::timeout;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    use crate::client::manager::{MSG_CONNECTED, MSG_DISCONNECTED};
    use crate::client::{ClientEvent, STATUS_CONNECTED, STATUS_CONNECTING};
    use crate::protocol::{Category, DisplayRecord};
    use crate::session::IdentityProvider;

    const WAIT: Duration = Duration::from_secs(5);

    /// Answers only once the test releases it.
    struct HeldIdentity(Mutex<Option<oneshot::Receiver<String>>>);

    #[async_trait]
    impl IdentityProvider for HeldIdentity {
        async fn display_name(&self) -> Option<String> {
            let answer = self.0.lock().take()?;
            answer.await.ok()
        }
    }

    async fn next_record(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> DisplayRecord {
        loop {
            let event = timeout(WAIT, events.recv())
                .await
                .expect("event within timeout")
                .expect("event stream open");
            if let ClientEvent::Record(record) = event {
                return record;
            }
        }
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            let registration = ws.next().await.unwrap().unwrap();
            assert_eq!(registration.into_text().unwrap().as_str(), "Alice");

            ws.send(Message::Text(r#"{"sender":"Server","message":"Welcome"}"#.into()))
                .await
                .unwrap();

            let line = ws.next().await.unwrap().unwrap();
            assert_eq!(line.into_text().unwrap().as_str(), "hello");

            ws.send(Message::Text(r#"{"sender":"Alice","message":"hello"}"#.into()))
                .await
                .unwrap();

            while let Some(Ok(_)) = ws.next().await {}
        });

        let (client, mut events) = ChatClient::builder()
            .page_url("http://127.0.0.1/")
            .port(port)
            .display_name("Alice")
            .start()
            .unwrap();

        let connected = next_record(&mut events).await;
        assert_eq!(connected.text, MSG_CONNECTED);

        let welcome = next_record(&mut events).await;
        assert_eq!(welcome.text, "Welcome");
        assert_eq!(welcome.category, Category::System);
        assert!(client.is_connected());

        client.send("   ").unwrap();
        client.send("hello").unwrap();

        let echo = next_record(&mut events).await;
        assert_eq!(echo.text, "Alice: hello");
        assert_eq!(echo.category, Category::User);

        client.shutdown().await;
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(matches!(client.send("late"), Err(Error::ClientStopped)));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_close_reports_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let _registration = ws.next().await;
            let _ = ws.close(None).await;
        });

        let (client, mut events) = ChatClient::builder()
            .page_url("http://127.0.0.1/")
            .port(port)
            .display_name("Alice")
            .reconnect_interval(Duration::from_secs(60))
            .start()
            .unwrap();

        assert_eq!(next_record(&mut events).await.text, MSG_CONNECTED);
        assert_eq!(next_record(&mut events).await.text, MSG_DISCONNECTED);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_status_stream_reports_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (client, mut events) = ChatClient::builder()
            .page_url("http://127.0.0.1/")
            .port(port)
            .display_name("Alice")
            .start()
            .unwrap();

        let mut statuses = Vec::new();
        while statuses.last().map(|s: &String| s.as_str()) != Some(STATUS_CONNECTED) {
            let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
            if let ClientEvent::Status(update) = event {
                statuses.push(update.text);
            }
        }
        assert_eq!(statuses, vec!["Connecting...", "Connected"]);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_state_is_connecting_while_identity_pending() {
        let (release, answer) = oneshot::channel();

        let (client, mut events) = ChatClient::builder()
            .page_url("http://127.0.0.1/")
            .port(1)
            .identity(HeldIdentity(Mutex::new(Some(answer))))
            .reconnect_interval(Duration::from_secs(60))
            .start()
            .unwrap();

        loop {
            let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
            if let ClientEvent::Status(update) = event {
                assert_eq!(update.text, STATUS_CONNECTING);
                break;
            }
        }
        assert_eq!(client.state(), ConnectionState::Connecting);

        drop(release);
        client.shutdown().await;
    }
}
