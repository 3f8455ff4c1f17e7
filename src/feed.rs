//! The ticket feed: keeps a locally-rendered ticket list consistent with the
//! remotely-mutated, filtered, ordered document set.
//!
//! The feed exclusively owns the single active subscription. Changing the
//! filter tears the old subscription down and opens a new one; a generation
//! counter discards batches that belong to a superseded subscription, so
//! overlapping `set_filter` calls and late callbacks after logout can never
//! mutate the published list.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::TicketBackend;
use crate::dto::map_batch;
use crate::types::{StatusFilter, Ticket};

/// What the presentation layer sees: the loading flag, the active partition,
/// and the current ordered ticket list.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub loading: bool,
    pub filter: StatusFilter,
    pub tickets: Vec<Ticket>,
    /// Set when the subscription failed to establish or errored mid-stream.
    /// The feed does not retry; the backend owns retry policy.
    pub error: Option<String>,
}

struct FeedInner {
    /// Bumped on every set_filter/dispose; batches carrying a stale
    /// generation are discarded.
    generation: u64,
    /// False between dispose() and the next set_filter().
    active: bool,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    backend: Arc<dyn TicketBackend>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    inner: Mutex<FeedInner>,
}

/// Handle to the feed. Clones share the same underlying state; the reducer
/// task is torn down when the last handle drops.
#[derive(Clone)]
pub struct TicketFeed {
    shared: Arc<Shared>,
}

impl TicketFeed {
    pub fn new(backend: Arc<dyn TicketBackend>) -> Self {
        let (snapshot_tx, _) = watch::channel(FeedSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                snapshot_tx,
                inner: Mutex::new(FeedInner {
                    generation: 0,
                    active: false,
                    task: None,
                }),
            }),
        }
    }

    /// Watch feed snapshots. Every remote change batch publishes a fresh
    /// snapshot; the receiver always observes the latest state.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Replace the active status filter: tear down the previous subscription,
    /// publish a loading state, and open a new standing query.
    ///
    /// Calling with the currently-active filter resubscribes; the caller
    /// observes nothing beyond a transient loading flicker.
    pub fn set_filter(&self, filter: StatusFilter) {
        let generation = {
            let mut inner = self.shared.inner.lock();
            if let Some(task) = inner.task.take() {
                task.abort();
            }
            inner.generation += 1;
            inner.active = true;
            inner.generation
        };

        self.shared.snapshot_tx.send_replace(FeedSnapshot {
            loading: true,
            filter,
            tickets: Vec::new(),
            error: None,
        });

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            run(shared, filter, generation).await;
        });

        let mut inner = self.shared.inner.lock();
        if inner.generation == generation {
            inner.task = Some(handle);
        } else {
            // Another set_filter (or dispose) won the race while we spawned.
            handle.abort();
        }
    }

    /// Tear down the subscription and clear the list. Called by the session
    /// gate on logout, before the signed-out state is announced; a batch
    /// arriving after this point is discarded.
    pub fn dispose(&self) {
        let mut inner = self.shared.inner.lock();
        inner.generation += 1;
        inner.active = false;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        drop(inner);

        self.shared.snapshot_tx.send_replace(FeedSnapshot::default());
    }
}

/// Reducer loop for one subscription generation.
async fn run(shared: Arc<Shared>, filter: StatusFilter, generation: u64) {
    let mut subscription = match shared.backend.subscribe(filter).await {
        Ok(sub) => sub,
        Err(e) => {
            tracing::warn!("ticket subscription for '{filter}' failed: {e}");
            shared.publish_if_current(generation, |snap| {
                snap.loading = false;
                snap.error = Some(e.to_string());
            });
            return;
        }
    };

    while let Some(batch) = subscription.next_batch().await {
        let tickets = map_batch(&batch);
        let applied = shared.publish_if_current(generation, move |snap| {
            snap.loading = false;
            snap.tickets = tickets;
            snap.error = None;
        });
        if !applied {
            return;
        }
    }

    // The store stopped emitting without being cancelled from our side.
    tracing::warn!("ticket subscription for '{filter}' ended unexpectedly");
    shared.publish_if_current(generation, |snap| {
        snap.loading = false;
        snap.error = Some("subscription ended unexpectedly".to_string());
    });
}

impl Shared {
    /// Publish a snapshot mutation iff this generation is still the live one.
    /// The inner lock is held across the send so generation checks and
    /// publications stay ordered.
    fn publish_if_current(
        &self,
        generation: u64,
        mutate: impl FnOnce(&mut FeedSnapshot),
    ) -> bool {
        let inner = self.inner.lock();
        if !inner.active || inner.generation != generation {
            return false;
        }
        self.snapshot_tx.send_modify(mutate);
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.inner.lock().task.take() {
            task.abort();
        }
    }
}
