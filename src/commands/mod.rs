mod auth;
mod close;
mod file;
mod ls;
mod show;
mod watch;

pub use auth::{cmd_account_add, cmd_login, cmd_logout};
pub use close::cmd_close;
pub use file::cmd_file;
pub use ls::cmd_ls;
pub use show::cmd_show;
pub use watch::cmd_watch;

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::backend::memory::MemoryBackend;
use crate::config::Config;
use crate::error::Result;
use crate::types::{Ticket, TicketStatus};

/// Open the configured backend.
pub(crate) fn open_backend(config: &Config) -> Result<Arc<MemoryBackend>> {
    Ok(Arc::new(MemoryBackend::with_data_file(
        config.data_file_path(),
    )?))
}

/// Structured command output: JSON for tooling, colored text for humans.
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output_json: bool) -> Result<()> {
        if output_json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else if let Some(text) = self.text {
            println!("{text}");
        }
        Ok(())
    }
}

/// Format a ticket for single-line display.
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id_padded = format!("{:12}", ticket.id);
    let status_str = format!("[{}]", ticket.status);

    let colored_status = match ticket.status {
        TicketStatus::Open => status_str.yellow().to_string(),
        TicketStatus::Closed => status_str.green().to_string(),
    };

    format!(
        "{} {} {} {} - {}",
        id_padded.cyan(),
        colored_status,
        ticket.patrimony,
        ticket.when.dimmed(),
        ticket.description
    )
}
