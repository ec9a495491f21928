use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::SharedStore;

/// Mint a bearer token for an existing directory user
pub async fn handle(
    user_id: i64,
    hours: Option<u64>,
    config: &AppConfig,
    store: SharedStore,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User {} not found", user_id))?;

    let expiry_hours = hours.unwrap_or(config.security.jwt_expiry_hours);
    let token = generate_jwt(&Claims::new(user.id, &user.username, expiry_hours)?, &config.security.jwt_secret)?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for '{}'", user.username),
            Some(json!({ "token": token, "expires_in_hours": expiry_hours })),
        ),
    }
}
