use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, open_backend};
use crate::backend::TicketBackend;
use crate::config::Config;
use crate::dto::map_ticket;
use crate::error::Result;
use crate::types::TicketStatus;

/// Display a single ticket in full.
pub async fn cmd_show(id: &str, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let backend = open_backend(&config)?;

    let raw = backend.get(id).await?;
    let ticket = map_ticket(&raw).map_err(crate::error::FixdeskError::Mapping)?;

    if output_json {
        return CommandOutput::new(json!(ticket)).print(true);
    }

    let status_line = match ticket.status {
        TicketStatus::Open => "open".yellow().to_string(),
        TicketStatus::Closed => "closed".green().to_string(),
    };

    println!("{} [{}]", ticket.id.cyan(), status_line);
    println!("  equipment   Patrimony {}", ticket.patrimony);
    println!("  problem     {}", ticket.description);
    println!("  registered  {}", ticket.when);
    if ticket.is_closed() {
        println!("  resolution  {}", ticket.resolution);
        if let Some(closed_when) = &ticket.closed_when {
            println!("  closed      {closed_when}");
        }
    }
    Ok(())
}
