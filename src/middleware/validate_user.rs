use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, resolved against the user directory.
///
/// Handlers receive it explicitly as `Extension<Caller>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub username: String,
}

/// Middleware that checks the token's user still exists in the directory
/// and that the username in the claims matches it.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state.store.find_user(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "User validation failed: user '{}' (ID: {}) not found",
            auth_user.username,
            auth_user.user_id
        );
        ApiError::forbidden(format!("User '{}' is not active", auth_user.username))
    })?;

    if user.username != auth_user.username {
        tracing::warn!(
            "User validation failed: token user '{}' doesn't match directory username '{}'",
            auth_user.username,
            user.username
        );
        return Err(ApiError::forbidden("User authentication mismatch"));
    }

    tracing::debug!("User validation successful: {} ({})", user.username, user.id);

    request.extensions_mut().insert(Caller {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}
