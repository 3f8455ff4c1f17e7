use clap::Parser;
use std::process::ExitCode;

use fixdesk::cli::{AccountAction, Cli, Commands, print_completions};
use fixdesk::commands::{
    cmd_account_add, cmd_close, cmd_file, cmd_login, cmd_logout, cmd_ls, cmd_show, cmd_watch,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login {
            email,
            password,
            json,
        } => cmd_login(&email, password, json).await,
        Commands::Logout { json } => cmd_logout(json).await,
        Commands::Account(AccountAction::Add {
            email,
            password,
            json,
        }) => cmd_account_add(&email, password, json).await,
        Commands::File {
            patrimony,
            description,
            json,
        } => cmd_file(&patrimony, &description, json).await,
        Commands::Ls { status, json } => cmd_ls(status.as_deref(), json).await,
        Commands::Show { id, json } => cmd_show(&id, json).await,
        Commands::Close {
            id,
            resolution,
            json,
        } => cmd_close(&id, &resolution, json).await,
        Commands::Watch { status } => cmd_watch(status.as_deref()).await,
        Commands::Completions { shell } => {
            print_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
