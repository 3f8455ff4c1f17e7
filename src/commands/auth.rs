use serde_json::json;

use super::{CommandOutput, open_backend};
use crate::backend::CredentialSource;
use crate::config::{AccountConfig, Config};
use crate::error::{AuthError, FixdeskError, Result};

/// Resolve the password from the flag or the FIXDESK_PASSWORD environment
/// variable. Never read from config; passwords are not persisted.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    std::env::var("FIXDESK_PASSWORD").map_err(|_| {
        FixdeskError::Config(
            "no password given; pass --password or set FIXDESK_PASSWORD".to_string(),
        )
    })
}

/// Sign in and remember the account e-mail for later invocations.
pub async fn cmd_login(email: &str, password: Option<String>, output_json: bool) -> Result<()> {
    let password = resolve_password(password)?;
    let mut config = Config::load()?;
    let backend = open_backend(&config)?;

    let session = backend.sign_in(email, &password).await?;

    config.account = Some(AccountConfig {
        email: email.to_string(),
    });
    config.save()?;

    CommandOutput::new(json!({
        "action": "signed_in",
        "uid": session.uid,
        "email": session.email,
    }))
    .with_text(format!("Signed in as {email}"))
    .print(output_json)
}

/// Sign out and forget the remembered account.
pub async fn cmd_logout(output_json: bool) -> Result<()> {
    let mut config = Config::load()?;
    let backend = open_backend(&config)?;

    // Each invocation is a fresh process, so there is usually no live
    // session to revoke; forgetting the account is the useful part.
    match backend.sign_out().await {
        Ok(()) | Err(AuthError::NotSignedIn) => {}
        Err(e) => return Err(e.into()),
    }

    config.account = None;
    config.save()?;

    CommandOutput::new(json!({ "action": "signed_out" }))
        .with_text("Signed out")
        .print(output_json)
}

/// Register a user account on the local backend (the analog of creating a
/// user in the managed service's console).
pub async fn cmd_account_add(
    email: &str,
    password: Option<String>,
    output_json: bool,
) -> Result<()> {
    let password = resolve_password(password)?;
    let config = Config::load()?;
    let backend = open_backend(&config)?;

    backend.add_user(email, &password)?;

    CommandOutput::new(json!({
        "action": "account_added",
        "email": email,
    }))
    .with_text(format!("Added account {email}"))
    .print(output_json)
}
