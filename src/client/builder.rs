//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and starting a [`ChatClient`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use chat_client::ChatClient;
//!
//! # async fn example() -> chat_client::Result<()> {
//! let (client, events) = ChatClient::builder()
//!     .page_url("https://chat.example.com/")
//!     .display_name("Alice")
//!     .max_reconnect_attempts(5)
//!     .reconnect_interval(Duration::from_secs(3))
//!     .start()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use crate::error::{Error, Result};
use crate::session::{IdentityProvider, SharedIdentity, StaticIdentity};
use crate::transport::{Transport, WebSocketTransport};

use super::config::{ClientConfig, DEFAULT_PORT};
use super::core::{ChatClient, LoopInputs};
use super::manager::{ConnectionManager, ManagerParts};
use super::retry::{ReconnectPolicy, TokioScheduler};
use super::sink::{ChannelSink, ClientEvent, PresentationSink};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`ChatClient`].
///
/// Use [`ChatClient::builder()`] to create a new builder.
pub struct ClientBuilder {
    /// URL of the hosting page.
    page_url: Option<String>,
    /// Chat server port.
    port: u16,
    /// Reconnection policy.
    policy: ReconnectPolicy,
    /// Display name source.
    identity: Option<SharedIdentity>,
    /// Transport override.
    transport: Option<Box<dyn Transport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            page_url: None,
            port: DEFAULT_PORT,
            policy: ReconnectPolicy::default(),
            identity: None,
            transport: None,
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("page_url", &self.page_url)
            .field("port", &self.port)
            .field("policy", &self.policy)
            .field("identity", &self.identity.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL of the page hosting the client.
    ///
    /// Its scheme picks `ws`/`wss` and its host is the chat server host.
    #[inline]
    #[must_use]
    pub fn page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    /// Overrides the chat server port (default 8080).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the automatic reconnect ceiling (default 5). Zero disables
    /// automatic reconnects.
    #[inline]
    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    /// Sets the delay before each automatic reconnect (default 3s).
    #[inline]
    #[must_use]
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.policy.interval = interval;
        self
    }

    /// Uses a fixed display name instead of asking a provider.
    #[inline]
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.identity = Some(Arc::new(StaticIdentity::new(name)));
        self
    }

    /// Sets the identity provider asked on first connect.
    #[inline]
    #[must_use]
    pub fn identity(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    /// Replaces the WebSocket transport.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no page URL is set or it is not `http`/`https`
    /// - [`Error::InvalidUrl`] if the page URL does not parse
    pub fn config(&self) -> Result<ClientConfig> {
        let page_url = self.page_url.as_deref().ok_or_else(|| {
            Error::config(
                "Page URL is required. Use .page_url() to set it.\n\
                 Example: ChatClient::builder().page_url(\"http://localhost/\")",
            )
        })?;

        ClientConfig::new(Url::parse(page_url)?, self.port, self.policy)
    }

    /// Starts the client and returns its event stream.
    ///
    /// Must be called from within a tokio runtime. The first connect starts
    /// immediately.
    ///
    /// # Errors
    ///
    /// See [`config`](Self::config).
    pub fn start(self) -> Result<(ChatClient, mpsc::UnboundedReceiver<ClientEvent>)> {
        let (sink, events) = ChannelSink::channel();
        let client = self.start_with_sink(sink)?;
        Ok((client, events))
    }

    /// Starts the client, delivering output to `sink`.
    ///
    /// # Errors
    ///
    /// See [`config`](Self::config).
    pub fn start_with_sink(self, sink: impl PresentationSink + 'static) -> Result<ChatClient> {
        let config = self.config()?;

        let (notices, notice_rx) = mpsc::unbounded_channel();
        let (scheduler, retry_rx) = TokioScheduler::channel();

        let manager = ConnectionManager::new(
            &config,
            ManagerParts {
                identity: self
                    .identity
                    .unwrap_or_else(|| Arc::new(StaticIdentity::anonymous())),
                transport: self
                    .transport
                    .unwrap_or_else(|| Box::new(WebSocketTransport::new())),
                scheduler: Box::new(scheduler),
                sink: Box::new(sink),
                notices,
            },
        );

        Ok(ChatClient::spawn(
            manager,
            LoopInputs {
                notices: notice_rx,
                retries: retry_rx,
            },
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
