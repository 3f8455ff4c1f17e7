use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FixdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = FixdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(FixdeskError::InvalidStatus(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &["open", "closed"];

/// The open/closed partition currently displayed. Held in memory only and
/// reset on restart; the default partition is the open one.
pub type StatusFilter = TicketStatus;

/// A single equipment-repair request record.
///
/// Invariant: `resolution` is non-empty iff `status == Closed`, and
/// `closed_at` is present iff `status == Closed`. Tickets move open -> closed
/// exclusively through [`close_ticket`](crate::close::close_ticket) and never
/// back; this client never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    /// Opaque server-assigned identifier.
    pub id: String,

    /// Equipment patrimony code.
    pub patrimony: String,

    /// Problem description.
    pub description: String,

    pub status: TicketStatus,

    /// Server-generated creation instant.
    pub created_at: Timestamp,

    /// Display form of `created_at`.
    pub when: String,

    /// Resolution text; empty until the ticket is closed.
    pub resolution: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<Timestamp>,

    /// Display form of `closed_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_when: Option<String>,
}

impl Ticket {
    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

/// An authenticated user context, opaque to this client. Created and
/// destroyed entirely by the credential source; never persisted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

/// Session state exposed to the presentation layer.
///
/// `Resolving` covers the window before the credential source's first
/// emission, during which callers must show a neutral loading state rather
/// than either the authenticated or unauthenticated tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Resolving,
    Absent,
    Present(Session),
}

impl SessionStatus {
    pub fn is_present(&self) -> bool {
        matches!(self, SessionStatus::Present(_))
    }
}
