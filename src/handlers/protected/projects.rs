use std::collections::BTreeSet;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{json_body, parse_id};
use crate::api::ProjectView;
use crate::database::models::{NewProject, ProjectChanges};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;
use crate::types::{next_modified, now};
use crate::validation::{CreateProjectInput, FieldErrors, UpdateMode, UpdateProjectInput};

/// POST /clients/:client_id/projects/ - create a project under a client.
///
/// Requested user ids are resolved "fetch all matching": ids with no
/// directory entry are dropped from the assignment rather than failing the
/// request. The project row and its assignment are written by two separate
/// store calls.
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(client_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ProjectView> {
    tracing::info!("Attempting to create project for client_id: {}", client_id);

    let client_id = parse_id(&client_id, "Client")?;
    let client = state.store.get_client(client_id).await.map_err(|e| {
        if matches!(e, DatabaseError::NotFound(_)) {
            tracing::error!("Client not found for ID: {}", client_id);
        }
        ApiError::from(e)
    })?;

    let body = json_body(payload)?;
    let input = CreateProjectInput::parse(&body).map_err(|e| {
        tracing::error!("Project creation failed: {}", e);
        e
    })?;

    let resolved: Vec<i64> = state
        .store
        .find_users(&input.users)
        .await?
        .into_iter()
        .map(|user| user.id)
        .collect();
    let requested: BTreeSet<i64> = input.users.iter().copied().collect();
    if resolved.len() < requested.len() {
        tracing::warn!(
            "Dropping {} unknown user id(s) from project assignment",
            requested.len() - resolved.len()
        );
    }

    let project = state
        .store
        .insert_project(NewProject {
            project_name: input.project_name,
            client_id: client.id,
            created_by: caller.id,
            created_at: now(),
        })
        .await?;
    let project = state.store.set_project_users(project.id, &resolved).await?;

    tracing::info!("Project created successfully: {}", project.id);
    Ok(ApiResponse::created(ProjectView::from(project)))
}

/// GET /projects/ - projects the caller is assigned to
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<ProjectView>> {
    tracing::info!("Listing projects for user: {}", caller.id);

    let projects = state.store.list_projects_for_user(caller.id).await?;
    Ok(ApiResponse::success(
        projects.into_iter().map(ProjectView::from).collect(),
    ))
}

/// GET /projects/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProjectView> {
    let id = parse_id(&id, "Project")?;
    let project = state.store.get_project(id).await?;
    Ok(ApiResponse::success(ProjectView::from(project)))
}

/// PUT /projects/:id/
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ProjectView> {
    update(state, &id, payload, UpdateMode::Full).await
}

/// PATCH /projects/:id/
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ProjectView> {
    update(state, &id, payload, UpdateMode::Partial).await
}

/// Unlike create, a supplied `users` list must resolve completely; one
/// unknown id rejects the whole request before anything is written.
async fn update(
    state: AppState,
    id: &str,
    payload: Result<Json<Value>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<ProjectView> {
    tracing::info!("Updating a project");

    let id = parse_id(id, "Project")?;
    let existing = state.store.get_project(id).await?;

    let body = json_body(payload)?;
    let input = UpdateProjectInput::parse(&body, mode).map_err(|e| {
        tracing::error!("Project update failed: {}", e);
        e
    })?;

    if let Some(requested) = &input.users {
        let found: BTreeSet<i64> = state
            .store
            .find_users(requested)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();
        let mut errors = FieldErrors::new();
        let requested: BTreeSet<i64> = requested.iter().copied().collect();
        for missing in requested.difference(&found) {
            errors.add(
                "users",
                format!("Invalid pk \"{}\" - object does not exist.", missing),
            );
        }
        errors.into_result().map_err(|e| {
            tracing::error!("Project update failed: {}", e);
            e
        })?;
    }

    let mut project = state
        .store
        .update_project(
            id,
            ProjectChanges {
                project_name: input.project_name,
                updated_at: next_modified(existing.updated_at),
            },
        )
        .await?;
    if let Some(users) = &input.users {
        project = state.store.set_project_users(id, users).await?;
    }

    tracing::info!("Project updated successfully: {}", project.id);
    Ok(ApiResponse::success(ProjectView::from(project)))
}

/// DELETE /projects/:id/
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    tracing::info!("Deleting a project");

    let id = parse_id(&id, "Project")?;
    state.store.delete_project(id).await?;

    tracing::info!("Project deleted successfully: {}", id);
    Ok(ApiResponse::no_content())
}
