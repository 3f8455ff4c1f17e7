pub mod backend;
pub mod cli;
pub mod close;
pub mod commands;
pub mod config;
pub mod dto;
pub mod error;
pub mod feed;
pub mod format;
pub mod session;
pub mod types;

pub use backend::{
    CredentialSource, RawTicket, ServerTime, SessionEvent, TicketBackend, TicketPatch,
    TicketSubscription,
};
pub use close::close_ticket;
pub use error::{
    AuthError, CloseError, FixdeskError, FormatError, MappingError, Result, StoreError,
};
pub use feed::{FeedSnapshot, TicketFeed};
pub use session::SessionGate;
pub use types::{
    Session, SessionStatus, StatusFilter, Ticket, TicketStatus, VALID_STATUSES,
};
