use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{json_body, parse_id};
use crate::api::{ClientDetail, ClientView};
use crate::database::models::{ClientChanges, NewClient};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;
use crate::types::{next_modified, now};
use crate::validation::{ClientInput, UpdateMode, MSG_REQUIRED};

/// GET /clients/ - every client with its projects nested
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ClientView>> {
    let clients = state.store.list_clients().await?;

    let mut views = Vec::with_capacity(clients.len());
    for client in clients {
        let projects = state.store.list_projects_for_client(client.id).await?;
        views.push(ClientView::new(client, projects));
    }

    Ok(ApiResponse::success(views))
}

/// POST /clients/ - create a client owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ClientView> {
    tracing::info!("Creating a new client");

    let body = json_body(payload)?;
    let input = ClientInput::for_create(&body).map_err(|e| {
        tracing::error!("Client creation failed: {}", e);
        e
    })?;
    let client_name = input
        .client_name
        .ok_or_else(|| ApiError::field_error("client_name", MSG_REQUIRED))?;

    let client = state
        .store
        .insert_client(NewClient {
            client_name,
            created_by: caller.id,
            created_at: now(),
        })
        .await?;

    tracing::info!("Client created successfully: {}", client.id);
    Ok(ApiResponse::created(ClientView::new(client, Vec::new())))
}

/// GET /clients/:id/ - client with `{id, name}` project summaries
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ClientDetail> {
    let id = parse_id(&id, "Client")?;
    let client = state.store.get_client(id).await?;
    tracing::info!("Retrieving client with ID: {}", client.id);

    let projects = state.store.list_projects_for_client(client.id).await?;
    Ok(ApiResponse::success(ClientDetail::new(client, projects)))
}

/// PUT /clients/:id/
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ClientView> {
    update(state, &id, payload, UpdateMode::Full).await
}

/// PATCH /clients/:id/
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ClientView> {
    update(state, &id, payload, UpdateMode::Partial).await
}

/// `updated_at` moves forward on every successful call, even when the
/// name is unchanged or absent
async fn update(
    state: AppState,
    id: &str,
    payload: Result<Json<Value>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<ClientView> {
    tracing::info!("Updating a client");

    let id = parse_id(id, "Client")?;
    let existing = state.store.get_client(id).await?;

    let body = json_body(payload)?;
    let input = ClientInput::for_update(&body, mode).map_err(|e| {
        tracing::error!("Client update failed: {}", e);
        e
    })?;

    let client = state
        .store
        .update_client(
            id,
            ClientChanges {
                client_name: input.client_name,
                updated_at: next_modified(existing.updated_at),
            },
        )
        .await?;
    let projects = state.store.list_projects_for_client(id).await?;

    tracing::info!("Client updated successfully: {}", client.id);
    Ok(ApiResponse::success(ClientView::new(client, projects)))
}

/// DELETE /clients/:id/ - cascades to the client's projects
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    tracing::info!("Deleting a client");

    let id = parse_id(&id, "Client")?;
    state.store.delete_client(id).await?;

    tracing::info!("Client deleted successfully: {}", id);
    Ok(ApiResponse::no_content())
}
