use std::sync::Arc;

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Client, ClientChanges, NewClient, NewProject, Project, ProjectChanges, User,
};

/// Durable storage for the user directory, clients and projects.
///
/// Implementations guarantee referential integrity (a project's owning
/// client and every assigned user must exist) and cascade client deletion
/// to the client's projects. Each call is atomic on its own; nothing spans
/// multiple calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cheap connectivity probe used by `/health`
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn create_user(&self, username: &str) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    /// Every existing user among `ids`; unknown ids are skipped, not reported
    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn insert_client(&self, client: NewClient) -> Result<Client, DatabaseError>;
    async fn get_client(&self, id: i64) -> Result<Client, DatabaseError>;
    async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError>;
    async fn update_client(&self, id: i64, changes: ClientChanges) -> Result<Client, DatabaseError>;
    /// Removes the client and every project it owns
    async fn delete_client(&self, id: i64) -> Result<(), DatabaseError>;

    async fn insert_project(&self, project: NewProject) -> Result<Project, DatabaseError>;
    async fn get_project(&self, id: i64) -> Result<Project, DatabaseError>;
    async fn list_projects_for_client(&self, client_id: i64) -> Result<Vec<Project>, DatabaseError>;
    async fn list_projects_for_user(&self, user_id: i64) -> Result<Vec<Project>, DatabaseError>;
    async fn update_project(&self, id: i64, changes: ProjectChanges) -> Result<Project, DatabaseError>;
    /// Replaces the assigned-user set wholesale
    async fn set_project_users(&self, id: i64, user_ids: &[i64]) -> Result<Project, DatabaseError>;
    async fn delete_project(&self, id: i64) -> Result<(), DatabaseError>;
}

pub type SharedStore = Arc<dyn RecordStore>;
