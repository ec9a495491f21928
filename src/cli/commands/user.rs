use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::database::SharedStore;

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    #[command(about = "Add a user to the directory")]
    Add {
        #[arg(help = "Unique username")]
        username: String,
    },

    #[command(about = "List directory users")]
    List,
}

pub async fn handle(cmd: UserCommands, store: SharedStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { username } => {
            let username = username.trim();
            if username.is_empty() {
                anyhow::bail!("username may not be blank");
            }
            let user = store.create_user(username).await?;
            output_success(
                &output_format,
                &format!("User '{}' created with id {}", user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::List => {
            let users = store.list_users().await?;
            let rows = users
                .iter()
                .map(|u| vec![u.id.to_string(), u.username.clone(), u.created_at.to_rfc3339()])
                .collect();
            output_rows(&output_format, "users", rows, json!(users))
        }
    }
}
