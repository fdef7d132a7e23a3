//! Reconnection policy and retry scheduling.
//!
//! After a handle closes the manager asks a [`Scheduler`] to fire a
//! [`RetryTicket`] after [`ReconnectPolicy::interval`]. The returned
//! [`ScheduledRetry`] is kept alongside the connection state so that a newer
//! connect can cancel it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{trace, warn};

use crate::identifiers::RetryTicket;

// ============================================================================
// Constants
// ============================================================================

/// Default ceiling of automatic reconnect attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before each automatic reconnect.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

// ============================================================================
// ReconnectPolicy
// ============================================================================

/// Bounded fixed-delay reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum automatic attempts between successful opens.
    pub max_attempts: u32,

    /// Delay before each attempt.
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl ReconnectPolicy {
    /// Returns `true` if another attempt is allowed after `attempts` so far.
    #[inline]
    #[must_use]
    pub const fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

// ============================================================================
// ScheduledRetry
// ============================================================================

/// Cancel callback of a scheduled retry.
type Canceller = Box<dyn FnOnce() + Send>;

/// A pending reconnect.
///
/// Dropping it without calling [`cancel`](Self::cancel) leaves the timer
/// running; the manager discards the firing by ticket in that case.
pub struct ScheduledRetry {
    /// Ticket the timer will fire with.
    ticket: RetryTicket,
    /// Stops the timer.
    canceller: Option<Canceller>,
}

impl ScheduledRetry {
    /// Creates a retry that can be cancelled through `canceller`.
    #[must_use]
    pub fn new(ticket: RetryTicket, canceller: impl FnOnce() + Send + 'static) -> Self {
        Self {
            ticket,
            canceller: Some(Box::new(canceller)),
        }
    }

    /// Creates a retry with nothing to cancel.
    #[inline]
    #[must_use]
    pub const fn detached(ticket: RetryTicket) -> Self {
        Self {
            ticket,
            canceller: None,
        }
    }

    /// Returns the ticket.
    #[inline]
    #[must_use]
    pub const fn ticket(&self) -> RetryTicket {
        self.ticket
    }

    /// Cancels the timer.
    pub fn cancel(mut self) {
        if let Some(canceller) = self.canceller.take() {
            canceller();
        }
        trace!(ticket = %self.ticket, "Retry cancelled");
    }
}

impl fmt::Debug for ScheduledRetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledRetry")
            .field("ticket", &self.ticket)
            .field("cancellable", &self.canceller.is_some())
            .finish()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Fires retry tickets after a delay.
pub trait Scheduler: Send {
    /// Arranges for `ticket` to fire after `delay`.
    fn schedule(&mut self, delay: Duration, ticket: RetryTicket) -> ScheduledRetry;
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler backed by `tokio::time::sleep` tasks.
///
/// Fired tickets are delivered on the channel returned by
/// [`TokioScheduler::channel`].
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    /// Fired ticket sender.
    tx: mpsc::UnboundedSender<RetryTicket>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver of its fired tickets.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RetryTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, ticket: RetryTicket) -> ScheduledRetry {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%ticket, "No tokio runtime, retry will not fire");
            return ScheduledRetry::detached(ticket);
        };

        let tx = self.tx.clone();
        let task = runtime.spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ticket);
        });

        ScheduledRetry::new(ticket, move || task.abort())
    }
}

// ============================================================================
// Tests
// ============================================================================
