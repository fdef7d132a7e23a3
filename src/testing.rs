//! In-memory collaborators for driving the connection manager in tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;

use crate::client::{
    ClientConfig, ConnectionManager, ManagerParts, PresentationSink, ReconnectPolicy,
    ScheduledRetry, Scheduler, StatusUpdate,
};
use crate::error::{Error, Result};
use crate::identifiers::{Generation, RetryTicket};
use crate::protocol::DisplayRecord;
use crate::session::IdentityProvider;
use crate::transport::{EventSender, Transport, TransportEvent, TransportHandle, TransportNotice};

// ============================================================================
// Fake Transport
// ============================================================================

/// Everything the fake transport saw.
#[derive(Debug, Default)]
pub(crate) struct Wire {
    pub opens: Vec<(Url, Generation)>,
    pub sent: Vec<(Generation, String)>,
    pub closed: Vec<Generation>,
    pub fail_opens: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub wire: Arc<Mutex<Wire>>,
}

impl Transport for FakeTransport {
    fn open(&mut self, url: &Url, events: EventSender) -> Result<Box<dyn TransportHandle>> {
        let mut wire = self.wire.lock();
        if wire.fail_opens {
            return Err(Error::transport_open(url.as_str(), "refused"));
        }

        wire.opens.push((url.clone(), events.generation()));
        Ok(Box::new(FakeHandle {
            generation: events.generation(),
            wire: Arc::clone(&self.wire),
        }))
    }
}

struct FakeHandle {
    generation: Generation,
    wire: Arc<Mutex<Wire>>,
}

impl TransportHandle for FakeHandle {
    fn send(&mut self, text: &str) -> Result<()> {
        self.wire.lock().sent.push((self.generation, text.to_string()));
        Ok(())
    }

    fn close(&mut self) {
        self.wire.lock().closed.push(self.generation);
    }
}

// ============================================================================
// Fake Scheduler
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct FakeScheduler {
    pub scheduled: Arc<Mutex<Vec<(Duration, RetryTicket)>>>,
    pub cancelled: Arc<Mutex<Vec<RetryTicket>>>,
}

impl Scheduler for FakeScheduler {
    fn schedule(&mut self, delay: Duration, ticket: RetryTicket) -> ScheduledRetry {
        self.scheduled.lock().push((delay, ticket));
        let cancelled = Arc::clone(&self.cancelled);
        ScheduledRetry::new(ticket, move || cancelled.lock().push(ticket))
    }
}

// ============================================================================
// Recording Sink
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    pub records: Arc<Mutex<Vec<DisplayRecord>>>,
    pub statuses: Arc<Mutex<Vec<StatusUpdate>>>,
}

impl PresentationSink for RecordingSink {
    fn display(&mut self, record: DisplayRecord) {
        self.records.lock().push(record);
    }

    fn status(&mut self, update: StatusUpdate) {
        self.statuses.lock().push(update);
    }
}

// ============================================================================
// Counting Identity
// ============================================================================

pub(crate) struct CountingIdentity {
    answer: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl IdentityProvider for CountingIdentity {
    async fn display_name(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.answer.clone())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A manager wired to fakes, plus probes into them.
pub(crate) struct Harness {
    pub manager: ConnectionManager,
    wire: Arc<Mutex<Wire>>,
    scheduler: FakeScheduler,
    sink: RecordingSink,
    prompts: Arc<AtomicUsize>,
    _notices: mpsc::UnboundedReceiver<TransportNotice>,
}

impl Harness {
    /// Disconnected manager for a page on `http://localhost/`.
    pub fn new(display_name: &str) -> Self {
        Self::with_policy(display_name, ReconnectPolicy::default())
    }

    /// Like [`new`](Self::new) with a custom reconnection policy.
    pub fn with_policy(display_name: &str, policy: ReconnectPolicy) -> Self {
        let config =
            ClientConfig::new(Url::parse("http://localhost/").unwrap(), 8080, policy).unwrap();

        let transport = FakeTransport::default();
        let scheduler = FakeScheduler::default();
        let sink = RecordingSink::default();
        let prompts = Arc::new(AtomicUsize::new(0));
        let (notices, notice_rx) = mpsc::unbounded_channel();

        let manager = ConnectionManager::new(
            &config,
            ManagerParts {
                identity: Arc::new(CountingIdentity {
                    answer: display_name.to_string(),
                    calls: Arc::clone(&prompts),
                }),
                transport: Box::new(transport.clone()),
                scheduler: Box::new(scheduler.clone()),
                sink: Box::new(sink.clone()),
                notices,
            },
        );

        Self {
            manager,
            wire: transport.wire,
            scheduler,
            sink,
            prompts,
            _notices: notice_rx,
        }
    }

    /// Manager that has connected and seen `Opened`.
    pub async fn connected(display_name: &str) -> Self {
        let mut harness = Self::new(display_name);
        harness.manager.connect().await;
        harness.notify(TransportEvent::Opened);
        harness
    }

    /// Delivers `event` from the live handle.
    pub fn notify(&mut self, event: TransportEvent) {
        let generation = self
            .manager
            .live_generation()
            .expect("no live handle to notify from");
        self.manager.handle_notice(TransportNotice { generation, event });
    }

    /// Fires the most recently scheduled retry.
    pub async fn fire_retry(&mut self) {
        let ticket = self.last_ticket();
        self.manager.handle_retry_due(ticket).await;
    }

    pub fn fail_opens(&self) {
        self.wire.lock().fail_opens = true;
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.wire
            .lock()
            .opens
            .iter()
            .map(|(url, _)| url.to_string())
            .collect()
    }

    pub fn sent(&self) -> Vec<String> {
        self.wire
            .lock()
            .sent
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn closed_generations(&self) -> Vec<Generation> {
        self.wire.lock().closed.clone()
    }

    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.scheduler
            .scheduled
            .lock()
            .iter()
            .map(|(delay, _)| *delay)
            .collect()
    }

    pub fn last_ticket(&self) -> RetryTicket {
        self.scheduler
            .scheduled
            .lock()
            .last()
            .map(|(_, ticket)| *ticket)
            .expect("nothing scheduled")
    }

    pub fn cancelled(&self) -> Vec<RetryTicket> {
        self.scheduler.cancelled.lock().clone()
    }

    pub fn records(&self) -> Vec<DisplayRecord> {
        self.sink.records.lock().clone()
    }

    pub fn last_record(&self) -> DisplayRecord {
        self.sink
            .records
            .lock()
            .last()
            .cloned()
            .expect("no records")
    }

    pub fn record_texts(&self) -> Vec<String> {
        self.records().into_iter().map(|record| record.text).collect()
    }

    pub fn status_texts(&self) -> Vec<String> {
        self.sink
            .statuses
            .lock()
            .iter()
            .map(|update| update.text.clone())
            .collect()
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}
