use serde_json::json;

use super::{CommandOutput, open_backend};
use crate::close::close_ticket;
use crate::config::Config;
use crate::error::Result;

/// Close a ticket with a resolution.
pub async fn cmd_close(id: &str, resolution: &str, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let backend = open_backend(&config)?;

    close_ticket(backend.as_ref(), id, resolution).await?;

    CommandOutput::new(json!({
        "id": id,
        "action": "closed",
        "resolution": resolution.trim(),
    }))
    .with_text(format!("Closed {id}"))
    .print(output_json)
}
