pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::app::build_store;
use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "ledger")]
#[command(about = "Ledger admin CLI - migrations, user directory and token minting")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "User directory management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Issue a bearer token for a user")]
    Token {
        #[arg(help = "User id")]
        user_id: i64,
        #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::User { cmd } => {
            require_durable_store(config)?;
            let store = build_store(config).await?;
            commands::user::handle(cmd, store, output_format).await
        }
        Commands::Token { user_id, hours } => {
            require_durable_store(config)?;
            let store = build_store(config).await?;
            commands::token::handle(user_id, hours, config, store, output_format).await
        }
    }
}

/// Directory commands need a store that outlives this process
fn require_durable_store(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        anyhow::bail!(
            "STORE_BACKEND=memory keeps users inside the server process; use SEED_USERS when starting the server, or point the CLI at PostgreSQL"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::user::UserCommands;

    #[test]
    fn parses_user_add() {
        let cli = Cli::try_parse_from(["ledger", "user", "add", "alice"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::User { cmd: UserCommands::Add { ref username } } if username == "alice"
        ));
    }

    #[test]
    fn parses_token_with_hours_and_json() {
        let cli = Cli::try_parse_from(["ledger", "token", "7", "--hours", "2", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Token { user_id: 7, hours: Some(2) }));
    }

    #[tokio::test]
    async fn directory_commands_refuse_memory_backend() {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;

        for args in [
            vec!["ledger", "user", "add", "alice"],
            vec!["ledger", "user", "list"],
            vec!["ledger", "token", "1"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            let err = run(cli, &config).await.unwrap_err();
            assert!(err.to_string().contains("STORE_BACKEND=memory"));
        }
    }

    #[test]
    fn rejects_non_numeric_user_id() {
        assert!(Cli::try_parse_from(["ledger", "token", "alice"]).is_err());
    }
}
