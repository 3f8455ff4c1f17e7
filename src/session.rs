//! Session gate: owns the authentication-session lifecycle and supervises
//! the ticket feed so no live subscription outlives a logout.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::backend::{CredentialSource, SessionEvent};
use crate::feed::TicketFeed;
use crate::types::SessionStatus;

pub struct SessionGate {
    feed: TicketFeed,
    status_tx: watch::Sender<SessionStatus>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionGate {
    /// Start observing the credential source. Invoked once at process start;
    /// the gate begins in `Resolving`, resolves the source's current state
    /// immediately, and then follows its emissions indefinitely.
    pub fn start(auth: Arc<dyn CredentialSource>, feed: TicketFeed) -> Arc<Self> {
        let (status_tx, _) = watch::channel(SessionStatus::Resolving);
        let gate = Arc::new(Self {
            feed,
            status_tx,
            task: Mutex::new(None),
        });

        let events = auth.observe_session();
        let handle = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move {
                // The observation stream does not replay; resolve the initial
                // state from the source before following events.
                match auth.current_session() {
                    Some(session) => gate.apply(SessionEvent::SignedIn(session)),
                    None => gate.apply(SessionEvent::SignedOut),
                }
                gate.follow(events, &auth).await;
            }
        });
        *gate.task.lock() = Some(handle);

        gate
    }

    /// Watch session status transitions.
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    async fn follow(
        &self,
        mut events: broadcast::Receiver<SessionEvent>,
        auth: &Arc<dyn CredentialSource>,
    ) {
        loop {
            match events.recv().await {
                Ok(event) => self.apply(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Intermediate transitions were lost; resync from the
                    // source's current state.
                    tracing::warn!("session stream lagged ({missed} events), resyncing");
                    match auth.current_session() {
                        Some(session) => self.apply(SessionEvent::SignedIn(session)),
                        None => self.apply(SessionEvent::SignedOut),
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn apply(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) => {
                self.status_tx
                    .send_replace(SessionStatus::Present(session));
            }
            SessionEvent::SignedOut => {
                // Tear the live subscription down before announcing the
                // signed-out state, so nothing acts on a stale handle.
                self.feed.dispose();
                self.status_tx.send_replace(SessionStatus::Absent);
            }
        }
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}
