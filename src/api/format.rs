use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{Client, Project};

/// Wire form of a project, shared by every project endpoint and nested
/// inside client listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub project_name: String,
    /// Owning client id
    pub client: i64,
    pub users: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Creator's user id
    pub created_by: i64,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            project_name: project.project_name,
            client: project.client_id,
            users: project.users,
            created_at: project.created_at,
            updated_at: project.updated_at,
            created_by: project.created_by,
        }
    }
}

/// `{id, name}` pair used by the client detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.project_name,
        }
    }
}

/// Client as returned by list, create and update: projects fully nested
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientView {
    pub id: i64,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Creator's username
    pub created_by: String,
    pub projects: Vec<ProjectView>,
}

impl ClientView {
    pub fn new(client: Client, projects: Vec<Project>) -> Self {
        Self {
            id: client.id,
            client_name: client.client_name,
            created_at: client.created_at,
            updated_at: client.updated_at,
            created_by: client.created_by_username,
            projects: projects.into_iter().map(ProjectView::from).collect(),
        }
    }
}

/// Client as returned by retrieve: projects denormalized to `{id, name}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDetail {
    pub id: i64,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub projects: Vec<ProjectSummary>,
}

impl ClientDetail {
    pub fn new(client: Client, projects: Vec<Project>) -> Self {
        Self {
            id: client.id,
            client_name: client.client_name,
            created_at: client.created_at,
            updated_at: client.updated_at,
            created_by: client.created_by_username,
            projects: projects.into_iter().map(ProjectSummary::from).collect(),
        }
    }
}
