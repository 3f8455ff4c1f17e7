//! The close-ticket operation.

use crate::backend::{TicketBackend, TicketPatch, fields};
use crate::error::CloseError;
use crate::types::TicketStatus;

/// Close a ticket with the given resolution.
///
/// The resolution must be non-empty after trimming; otherwise the operation
/// fails locally without contacting the store. On valid input exactly one
/// combined mutation is issued (closed status, resolution, server-assigned
/// closure instant), so the ticket is never observably closed with an empty
/// resolution. Remote failures are returned as-is with no retry; the ticket
/// stays open and the user may try again. The list refreshes through the live
/// subscription, not a manual refetch.
pub async fn close_ticket(
    backend: &dyn TicketBackend,
    id: &str,
    resolution: &str,
) -> Result<(), CloseError> {
    let resolution = resolution.trim();
    if resolution.is_empty() {
        return Err(CloseError::EmptyResolution);
    }

    let raw = backend.get(id).await?;
    if raw.str_field(fields::STATUS) == Some(TicketStatus::Closed.as_str()) {
        return Err(CloseError::AlreadyClosed(id.to_string()));
    }

    backend.close(id, TicketPatch::close(resolution)).await?;
    Ok(())
}
