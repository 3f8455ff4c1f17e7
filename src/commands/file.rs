use serde_json::json;

use super::{CommandOutput, open_backend};
use crate::config::Config;
use crate::error::Result;

/// File a new repair request.
pub async fn cmd_file(patrimony: &str, description: &str, output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let backend = open_backend(&config)?;

    let id = backend.create_ticket(patrimony, description)?;

    CommandOutput::new(json!({
        "id": id,
        "action": "filed",
        "patrimony": patrimony,
    }))
    .with_text(format!("Filed {id} for patrimony {patrimony}"))
    .print(output_json)
}
