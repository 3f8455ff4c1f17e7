//! Session gate lifecycle and its supervision of the ticket feed.

mod common;

use tokio::sync::watch;

use fixdesk::backend::CredentialSource;
use fixdesk::feed::TicketFeed;
use fixdesk::session::SessionGate;
use fixdesk::types::{SessionStatus, TicketStatus};

use common::{seeded_backend, wait_until};

async fn wait_for(
    rx: &mut watch::Receiver<SessionStatus>,
    pred: impl Fn(&SessionStatus) -> bool,
) -> SessionStatus {
    loop {
        let status = rx.borrow().clone();
        if pred(&status) {
            return status;
        }
        rx.changed().await.expect("session gate stopped publishing");
    }
}

#[tokio::test]
async fn test_gate_starts_resolving_then_absent() {
    let backend = seeded_backend().await;
    let feed = TicketFeed::new(backend.clone());
    let gate = SessionGate::start(backend, feed);

    // Before the first emission the caller sees neither tree.
    assert_eq!(gate.status(), SessionStatus::Resolving);

    let mut rx = gate.watch();
    let status = wait_for(&mut rx, |s| *s != SessionStatus::Resolving).await;
    assert_eq!(status, SessionStatus::Absent);
}

#[tokio::test]
async fn test_gate_resolves_existing_session() {
    let backend = seeded_backend().await;
    let session = backend.sign_in("tech@example.com", "hunter2").await.unwrap();

    let feed = TicketFeed::new(backend.clone());
    let gate = SessionGate::start(backend, feed);
    let mut rx = gate.watch();

    let status = wait_for(&mut rx, |s| s.is_present()).await;
    assert_eq!(status, SessionStatus::Present(session));
}

#[tokio::test]
async fn test_sign_in_and_out_drive_the_gate() {
    let backend = seeded_backend().await;
    let feed = TicketFeed::new(backend.clone());
    let gate = SessionGate::start(backend.clone(), feed);
    let mut rx = gate.watch();

    wait_for(&mut rx, |s| *s == SessionStatus::Absent).await;

    backend.sign_in("tech@example.com", "hunter2").await.unwrap();
    wait_for(&mut rx, |s| s.is_present()).await;

    backend.sign_out().await.unwrap();
    wait_for(&mut rx, |s| *s == SessionStatus::Absent).await;
}

#[tokio::test]
async fn test_logout_tears_down_feed_before_announcing_absent() {
    let backend = seeded_backend().await;
    backend.sign_in("tech@example.com", "hunter2").await.unwrap();

    let feed = TicketFeed::new(backend.clone());
    let gate = SessionGate::start(backend.clone(), feed.clone());
    let mut rx = gate.watch();
    wait_for(&mut rx, |s| s.is_present()).await;

    feed.set_filter(TicketStatus::Open);
    wait_until(|| feed.snapshot().tickets.len() == 3).await;
    assert_eq!(backend.active_subscriptions(), 1);

    backend.sign_out().await.unwrap();
    wait_for(&mut rx, |s| *s == SessionStatus::Absent).await;

    // By the time the signed-out state is observable, the feed has already
    // been cleared; a later remote change must not resurrect the list.
    let snapshot = feed.snapshot();
    assert!(snapshot.tickets.is_empty());
    assert!(!snapshot.loading);
    wait_until(|| backend.active_subscriptions() == 0).await;

    backend.create_ticket("PAT-late", "arrived after logout").unwrap();
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(feed.snapshot().tickets.is_empty());
}
