use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::types::VALID_STATUSES;

#[derive(Parser)]
#[command(name = "fixdesk")]
#[command(about = "Equipment-repair ticket tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with an account e-mail
    Login {
        /// Account e-mail
        email: String,

        /// Password (or set FIXDESK_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and forget the remembered account
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts on the local backend
    #[command(subcommand)]
    Account(AccountAction),

    /// File a new repair request
    #[command(visible_alias = "f")]
    File {
        /// Equipment patrimony code
        patrimony: String,

        /// Problem description
        #[arg(short, long)]
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tickets in one status partition
    #[command(visible_alias = "l")]
    Ls {
        /// Status: open or closed (default from config)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display a ticket in full
    #[command(visible_alias = "s")]
    Show {
        /// Ticket ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Close a ticket with a resolution
    #[command(visible_alias = "c")]
    Close {
        /// Ticket ID
        id: String,

        /// Resolution text
        #[arg(short, long)]
        resolution: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow the live ticket feed, reprinting on every change
    Watch {
        /// Status: open or closed (default from config)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Register a user account
    Add {
        /// Account e-mail
        email: String,

        /// Password (or set FIXDESK_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_status(s: &str) -> Result<String, String> {
    let lower = s.to_lowercase();
    if VALID_STATUSES.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(format!(
            "invalid status '{}'. Must be one of: {}",
            s,
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Print completions for the given shell to stdout.
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "fixdesk", &mut io::stdout());
}
