//! Backend seams for the credential source and the document store.
//!
//! Both collaborators are opaque managed services: the credential source
//! emits session-changed events indefinitely, and the document store accepts
//! standing filtered queries that push fresh record batches on every change.
//! The traits here are what the rest of the client is written against; the
//! [`memory`] module provides the reference implementation.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::error::{AuthError, StoreError};
use crate::types::{Session, StatusFilter};

/// Wire field names for ticket documents.
pub mod fields {
    pub const PATRIMONY: &str = "patrimony";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const CLOSED_AT: &str = "closed_at";
    pub const RESOLUTION: &str = "resolution";
}

/// A ticket document exactly as the store delivers it. Timestamps travel as
/// RFC 3339 strings; field presence is validated by the DTO mapper, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTicket {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl RawTicket {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Read a field as a string, if present and string-valued.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

/// Sentinel for an instant the server assigns at write time. Keeping this in
/// the patch (rather than a client clock reading) means the closure instant
/// and the rest of the patch land in the same write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerTime;

/// The combined close mutation: status, resolution, and the server-assigned
/// closure instant applied as a single atomic update, so a ticket is never
/// observably closed with an empty resolution.
#[derive(Debug, Clone)]
pub struct TicketPatch {
    pub resolution: String,
    pub closed_at: ServerTime,
}

impl TicketPatch {
    pub fn close(resolution: impl Into<String>) -> Self {
        Self {
            resolution: resolution.into(),
            closed_at: ServerTime,
        }
    }
}

/// Session lifecycle notifications from the credential source.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Cancels its standing query when dropped.
pub struct SubscriptionGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f();
        }
    }
}

impl std::fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionGuard").finish_non_exhaustive()
    }
}

/// A standing filtered query against the store.
///
/// The store pushes a full batch of matching records on every change, in
/// emission order, until the subscription is dropped. Dropping it cancels
/// the query; there is no unsubscribe call to forget.
#[derive(Debug)]
pub struct TicketSubscription {
    batches: mpsc::UnboundedReceiver<Vec<RawTicket>>,
    _guard: SubscriptionGuard,
}

impl TicketSubscription {
    pub fn new(
        batches: mpsc::UnboundedReceiver<Vec<RawTicket>>,
        guard: SubscriptionGuard,
    ) -> Self {
        Self {
            batches,
            _guard: guard,
        }
    }

    /// The next record batch, or `None` once the store stops emitting.
    pub async fn next_batch(&mut self) -> Option<Vec<RawTicket>> {
        self.batches.recv().await
    }
}

/// Opaque credential source.
///
/// The observation stream is lazy, infinite, and restartable; the source is
/// trusted to emit indefinitely, so no error states are defined on it.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Observe session lifecycle events. Does not replay the current state;
    /// pair with [`current_session`](CredentialSource::current_session) to
    /// resolve the initial value.
    fn observe_session(&self) -> broadcast::Receiver<SessionEvent>;

    fn current_session(&self) -> Option<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Opaque subscribable document store holding the ticket collection.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    /// Open a standing query for tickets in the given status partition.
    /// Emits the current snapshot immediately, then a fresh batch on every
    /// change, in server-determined order (reverse-chronological creation).
    async fn subscribe(&self, filter: StatusFilter)
    -> Result<TicketSubscription, StoreError>;

    async fn get(&self, id: &str) -> Result<RawTicket, StoreError>;

    /// Apply the combined close mutation as a single write, resolving the
    /// [`ServerTime`] sentinel against the server clock.
    async fn close(&self, id: &str, patch: TicketPatch) -> Result<(), StoreError>;
}
