use std::sync::Arc;

use serde_json::json;

use super::{CommandOutput, format_ticket_line, open_backend};
use crate::backend::TicketBackend;
use crate::config::Config;
use crate::error::{FixdeskError, Result};
use crate::feed::{FeedSnapshot, TicketFeed};
use crate::types::StatusFilter;

/// List tickets in one status partition via the live feed.
pub async fn cmd_ls(status: Option<&str>, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let filter: StatusFilter = match status {
        Some(s) => s.parse()?,
        None => config.default_status,
    };

    let backend = open_backend(&config)?;
    let snapshot = first_settled_snapshot(backend, filter).await?;

    if output_json {
        return CommandOutput::new(json!({
            "filter": filter.to_string(),
            "count": snapshot.tickets.len(),
            "tickets": snapshot.tickets,
        }))
        .print(true);
    }

    if snapshot.tickets.is_empty() {
        println!("No {filter} tickets");
        return Ok(());
    }
    for ticket in &snapshot.tickets {
        println!("{}", format_ticket_line(ticket));
    }
    Ok(())
}

/// Open a feed for the filter and wait for the first settled snapshot.
pub(crate) async fn first_settled_snapshot(
    backend: Arc<dyn TicketBackend>,
    filter: StatusFilter,
) -> Result<FeedSnapshot> {
    let feed = TicketFeed::new(backend);
    let mut rx = feed.watch();
    feed.set_filter(filter);

    loop {
        rx.changed()
            .await
            .map_err(|_| FixdeskError::Other("ticket feed closed".to_string()))?;
        let snapshot = rx.borrow().clone();
        if snapshot.loading {
            continue;
        }
        if let Some(error) = snapshot.error {
            return Err(FixdeskError::Other(error));
        }
        return Ok(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::types::TicketStatus;

    #[tokio::test]
    async fn test_first_settled_snapshot_over_seeded_backend() {
        let backend = MemoryBackend::new();
        backend.create_ticket("PAT-1", "loose hinge").unwrap();
        backend.create_ticket("PAT-2", "dim display").unwrap();

        let snapshot = first_settled_snapshot(Arc::new(backend), TicketStatus::Open)
            .await
            .unwrap();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.tickets.len(), 2);
    }

    #[tokio::test]
    async fn test_first_settled_snapshot_empty_partition() {
        let backend = MemoryBackend::new();
        backend.create_ticket("PAT-1", "loose hinge").unwrap();

        let snapshot = first_settled_snapshot(Arc::new(backend), TicketStatus::Closed)
            .await
            .unwrap();
        assert!(snapshot.tickets.is_empty());
    }
}
