//! Shaping raw store records into [`Ticket`] entities.

use crate::backend::{RawTicket, fields};
use crate::error::MappingError;
use crate::format::{format_timestamp, parse_timestamp};
use crate::types::{Ticket, TicketStatus};

/// Map a raw record into a [`Ticket`].
///
/// Pure and total for well-formed input. Required fields (id, patrimony,
/// description, status, created_at) produce a [`MappingError`] when missing
/// or malformed; the optional resolution defaults to empty and an absent
/// closed timestamp is simply `None`.
pub fn map_ticket(raw: &RawTicket) -> Result<Ticket, MappingError> {
    if raw.id.is_empty() {
        return Err(MappingError::MissingField("id"));
    }

    let patrimony = required_str(raw, fields::PATRIMONY)?;
    let description = required_str(raw, fields::DESCRIPTION)?;

    let status: TicketStatus = required_str(raw, fields::STATUS)?
        .parse()
        .map_err(|_| MappingError::InvalidStatus(raw.str_field(fields::STATUS).unwrap_or_default().to_string()))?;

    let created_raw = required_str(raw, fields::CREATED_AT)?;
    let created_at = parse_timestamp(created_raw)
        .map_err(|_| MappingError::InvalidTimestamp(created_raw.to_string()))?;

    let closed_at = match raw.str_field(fields::CLOSED_AT) {
        Some(s) => Some(
            parse_timestamp(s).map_err(|_| MappingError::InvalidTimestamp(s.to_string()))?,
        ),
        None => None,
    };

    let resolution = raw
        .str_field(fields::RESOLUTION)
        .unwrap_or_default()
        .to_string();

    Ok(Ticket {
        id: raw.id.clone(),
        patrimony: patrimony.to_string(),
        description: description.to_string(),
        status,
        when: format_timestamp(&created_at),
        created_at,
        resolution,
        closed_when: closed_at.as_ref().map(format_timestamp),
        closed_at,
    })
}

/// Map a batch, preserving server order. Malformed records are logged and
/// skipped rather than aborting the whole list.
pub fn map_batch(batch: &[RawTicket]) -> Vec<Ticket> {
    batch
        .iter()
        .filter_map(|raw| match map_ticket(raw) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                tracing::warn!("skipping malformed ticket record '{}': {e}", raw.id);
                None
            }
        })
        .collect()
}

fn required_str<'a>(raw: &'a RawTicket, name: &'static str) -> Result<&'a str, MappingError> {
    raw.str_field(name).ok_or(MappingError::MissingField(name))
}
