//! Shared helpers for integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use fixdesk::backend::memory::MemoryBackend;
use fixdesk::backend::{
    RawTicket, SubscriptionGuard, TicketBackend, TicketPatch, TicketSubscription, fields,
};
use fixdesk::error::StoreError;
use fixdesk::types::StatusFilter;

/// Build a raw open-ticket record with a fixed creation instant.
pub fn raw_ticket(id: &str, status: &str, created_at: &str) -> RawTicket {
    let mut raw = RawTicket::new(id);
    raw.set_field(fields::PATRIMONY, format!("PAT-{id}"));
    raw.set_field(fields::DESCRIPTION, format!("problem on {id}"));
    raw.set_field(fields::STATUS, status);
    raw.set_field(fields::CREATED_AT, created_at);
    raw
}

/// A memory backend seeded with three open and two closed tickets.
pub async fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend.add_user("tech@example.com", "hunter2").unwrap();
    for i in 0..3 {
        backend
            .create_ticket(&format!("PAT-open-{i}"), "needs repair")
            .unwrap();
    }
    for i in 0..2 {
        let id = backend
            .create_ticket(&format!("PAT-closed-{i}"), "was broken")
            .unwrap();
        backend.close(&id, TicketPatch::close("fixed")).await.unwrap();
    }
    Arc::new(backend)
}

/// Poll until `cond` holds, yielding to let spawned tasks run.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

/// A scripted backend: tests hold the sending half of every subscription and
/// inject batches by hand, to exercise stale-callback handling.
pub struct StubBackend {
    senders: Mutex<Vec<mpsc::UnboundedSender<Vec<RawTicket>>>>,
    active: Arc<AtomicUsize>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            senders: Mutex::new(Vec::new()),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of subscriptions opened so far.
    pub fn opened(&self) -> usize {
        self.senders.lock().len()
    }

    /// Number of subscriptions still standing.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Inject a batch into the nth subscription. Returns false if that
    /// subscription has already been torn down.
    pub fn send_batch(&self, index: usize, batch: Vec<RawTicket>) -> bool {
        self.senders.lock()[index].send(batch).is_ok()
    }
}

#[async_trait]
impl TicketBackend for StubBackend {
    async fn subscribe(
        &self,
        _filter: StatusFilter,
    ) -> Result<TicketSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        let guard = SubscriptionGuard::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        });
        Ok(TicketSubscription::new(rx, guard))
    }

    async fn get(&self, id: &str) -> Result<RawTicket, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn close(&self, _id: &str, _patch: TicketPatch) -> Result<(), StoreError> {
        Ok(())
    }
}
