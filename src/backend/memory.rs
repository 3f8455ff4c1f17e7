//! In-memory backend standing in for the managed auth + document service.
//!
//! Documents live in a `DashMap`; change fan-out uses a tokio broadcast
//! channel, and each standing query runs a forwarding task that sends the
//! current filtered snapshot immediately and a fresh one on every change.
//! An optional JSON data file makes the CLI survive restarts.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::error::{AuthError, StoreError};
use crate::format::wire_now;
use crate::types::{Session, StatusFilter, TicketStatus};

use super::{
    CredentialSource, RawTicket, ServerTime, SessionEvent, SubscriptionGuard, TicketBackend,
    TicketPatch, TicketSubscription, fields,
};

use async_trait::async_trait;

/// On-disk shape of the data file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DataFile {
    #[serde(default)]
    users: BTreeMap<String, String>,
    #[serde(default)]
    tickets: Vec<RawTicket>,
}

pub struct MemoryBackend {
    docs: Arc<DashMap<String, RawTicket>>,
    changes: broadcast::Sender<()>,
    users: DashMap<String, SecretString>,
    session: Mutex<Option<Session>>,
    session_tx: broadcast::Sender<SessionEvent>,
    data_file: Option<PathBuf>,
    writes: AtomicU64,
    subscribers: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        let (session_tx, _) = broadcast::channel(64);
        Self {
            docs: Arc::new(DashMap::new()),
            changes,
            users: DashMap::new(),
            session: Mutex::new(None),
            session_tx,
            data_file: None,
            writes: AtomicU64::new(0),
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a backend persisted to (and loaded from) a JSON data file.
    pub fn with_data_file(path: PathBuf) -> Result<Self, StoreError> {
        let mut backend = Self::new();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let data: DataFile = serde_json::from_str(&content)?;
            for (email, password) in data.users {
                backend.users.insert(email, SecretString::from(password));
            }
            for ticket in data.tickets {
                backend.docs.insert(ticket.id.clone(), ticket);
            }
        }
        backend.data_file = Some(path);
        Ok(backend)
    }

    /// Register a user account (server-side administration, out of band for
    /// the client proper).
    pub fn add_user(&self, email: &str, password: &str) -> Result<(), StoreError> {
        self.users
            .insert(email.to_string(), SecretString::from(password.to_string()));
        self.persist()
    }

    /// File a new repair request (the server-side creation path). Returns
    /// the assigned ticket id.
    pub fn create_ticket(
        &self,
        patrimony: &str,
        description: &str,
    ) -> Result<String, StoreError> {
        let id = format!("t-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let mut raw = RawTicket::new(id.clone());
        raw.set_field(fields::PATRIMONY, patrimony);
        raw.set_field(fields::DESCRIPTION, description);
        raw.set_field(fields::STATUS, TicketStatus::Open.as_str());
        raw.set_field(fields::CREATED_AT, wire_now());
        self.docs.insert(id.clone(), raw);
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.persist()?;
        self.notify();
        Ok(id)
    }

    /// Number of write mutations issued so far.
    pub fn writes_issued(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of currently standing queries.
    pub fn active_subscriptions(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    fn notify(&self) {
        // No receivers is fine; nobody is watching.
        let _ = self.changes.send(());
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let mut data = DataFile::default();
        for entry in self.users.iter() {
            data.users
                .insert(entry.key().clone(), entry.value().expose_secret().to_string());
        }
        data.tickets = snapshot_all(&self.docs);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&data)?)?;
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// All documents, ordered like the server orders them: newest first.
fn snapshot_all(docs: &DashMap<String, RawTicket>) -> Vec<RawTicket> {
    let mut tickets: Vec<RawTicket> = docs.iter().map(|e| e.value().clone()).collect();
    sort_newest_first(&mut tickets);
    tickets
}

/// Documents in one status partition, newest first.
fn snapshot_filtered(docs: &DashMap<String, RawTicket>, filter: StatusFilter) -> Vec<RawTicket> {
    let mut tickets: Vec<RawTicket> = docs
        .iter()
        .filter(|e| e.value().str_field(fields::STATUS) == Some(filter.as_str()))
        .map(|e| e.value().clone())
        .collect();
    sort_newest_first(&mut tickets);
    tickets
}

// RFC 3339 wire timestamps sort lexicographically, so string comparison is
// enough; ties fall back to id for a stable order.
fn sort_newest_first(tickets: &mut [RawTicket]) {
    tickets.sort_by(|a, b| {
        let ta = a.str_field(fields::CREATED_AT).unwrap_or_default();
        let tb = b.str_field(fields::CREATED_AT).unwrap_or_default();
        tb.cmp(ta).then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl TicketBackend for MemoryBackend {
    async fn subscribe(
        &self,
        filter: StatusFilter,
    ) -> Result<TicketSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut changes = self.changes.subscribe();

        // Initial snapshot before any change can race it.
        if tx.send(snapshot_filtered(&self.docs, filter)).is_err() {
            return Err(StoreError::Closed);
        }

        self.subscribers.fetch_add(1, Ordering::SeqCst);
        let docs = Arc::clone(&self.docs);
        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        // A lagged receiver still ends up with the latest
                        // snapshot, since every emission is a full recompute.
                        if tx.send(snapshot_filtered(&docs, filter)).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let subscribers = Arc::clone(&self.subscribers);
        let guard = SubscriptionGuard::new(move || {
            handle.abort();
            subscribers.fetch_sub(1, Ordering::SeqCst);
        });

        Ok(TicketSubscription::new(rx, guard))
    }

    async fn get(&self, id: &str) -> Result<RawTicket, StoreError> {
        self.docs
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn close(&self, id: &str, patch: TicketPatch) -> Result<(), StoreError> {
        let TicketPatch {
            resolution,
            closed_at: ServerTime,
        } = patch;
        {
            let mut entry = self
                .docs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            entry.set_field(fields::STATUS, TicketStatus::Closed.as_str());
            entry.set_field(fields::RESOLUTION, resolution);
            entry.set_field(fields::CLOSED_AT, wire_now());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.persist()?;
        self.notify();
        Ok(())
    }
}

#[async_trait]
impl CredentialSource for MemoryBackend {
    fn observe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    fn current_session(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let stored = self
            .users
            .get(email)
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;
        if stored.value().expose_secret() != password {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            uid: format!("u-{}", &Uuid::new_v4().simple().to_string()[..8]),
            email: email.to_string(),
        };
        *self.session.lock() = Some(session.clone());
        let _ = self.session_tx.send(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.session.lock().take().is_none() {
            return Err(AuthError::NotSignedIn);
        }
        let _ = self.session_tx.send(SessionEvent::SignedOut);
        Ok(())
    }
}
