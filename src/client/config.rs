//! Client configuration and endpoint derivation.
//!
//! The chat server lives on the same host as the page that hosts the client,
//! on a fixed port. A page served over `https` talks `wss`; anything else
//! talks plain `ws`.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

use super::retry::ReconnectPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Well-known chat server port.
pub const DEFAULT_PORT: u16 = 8080;

// ============================================================================
// ClientConfig
// ============================================================================

/// Validated client configuration.
///
/// Built by [`ClientBuilder`](super::ClientBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// URL of the hosting page.
    page_url: Url,

    /// Derived chat server endpoint.
    endpoint: Url,

    /// Reconnection policy.
    policy: ReconnectPolicy,
}

impl ClientConfig {
    /// Creates a configuration for `page_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the page is not `http`/`https` or has no host
    /// - [`Error::InvalidUrl`] if the derived endpoint does not parse
    pub fn new(page_url: Url, port: u16, policy: ReconnectPolicy) -> Result<Self> {
        let endpoint = endpoint_for(&page_url, port)?;

        Ok(Self {
            page_url,
            endpoint,
            policy,
        })
    }

    /// Returns the hosting page URL.
    #[inline]
    #[must_use]
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Returns the chat server endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the reconnection policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Returns `true` if the endpoint uses TLS.
    #[inline]
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.endpoint.scheme() == "wss"
    }
}

// ============================================================================
// Endpoint Derivation
// ============================================================================

/// Derives `<ws|wss>://<page host>:<port>` from a page URL.
///
/// # Errors
///
/// - [`Error::Config`] if the page is not `http`/`https` or has no host
/// - [`Error::InvalidUrl`] if the result does not parse
pub fn endpoint_for(page_url: &Url, port: u16) -> Result<Url> {
    let scheme = match page_url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(Error::config(format!(
                "Page URL must be http or https, got '{other}'"
            )));
        }
    };

    let host = page_url
        .host_str()
        .ok_or_else(|| Error::config(format!("Page URL has no host: {page_url}")))?;

    Ok(Url::parse(&format!("{scheme}://{host}:{port}"))?)
}

// ============================================================================
// Tests
// ============================================================================
