use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Client, ClientChanges, NewClient, NewProject, Project, ProjectChanges, User,
};
use crate::database::repository::RecordStore;
use crate::types::truncate_to_storage;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    clients: BTreeMap<i64, ClientRow>,
    projects: BTreeMap<i64, Project>,
    next_user_id: i64,
    next_client_id: i64,
    next_project_id: i64,
}

/// Client as stored; the creator's username is joined at read time
#[derive(Clone)]
struct ClientRow {
    id: i64,
    client_name: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    created_by: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn render_client(&self, row: &ClientRow) -> Result<Client, DatabaseError> {
        let creator = self
            .users
            .get(&row.created_by)
            .ok_or_else(|| DatabaseError::not_found("User", row.created_by))?;
        Ok(Client {
            id: row.id,
            client_name: row.client_name.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
            created_by_username: creator.username.clone(),
        })
    }
}

/// In-process record store with the same integrity rules as the PostgreSQL one.
///
/// Backs the integration tests and `STORE_BACKEND=memory` demo runs. All
/// tables sit behind one lock, so every call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, username: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict(format!("username '{}' already exists", username)));
        }
        let id = Tables::next_id(&mut tables.next_user_id);
        let user = User {
            id,
            username: username.to_string(),
            created_at: truncate_to_storage(Utc::now()),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn insert_client(&self, client: NewClient) -> Result<Client, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&client.created_by) {
            return Err(DatabaseError::not_found("User", client.created_by));
        }
        let id = Tables::next_id(&mut tables.next_client_id);
        let row = ClientRow {
            id,
            client_name: client.client_name,
            created_at: client.created_at,
            updated_at: client.created_at,
            created_by: client.created_by,
        };
        let rendered = tables.render_client(&row)?;
        tables.clients.insert(id, row);
        Ok(rendered)
    }

    async fn get_client(&self, id: i64) -> Result<Client, DatabaseError> {
        let tables = self.tables.read().await;
        let row = tables
            .clients
            .get(&id)
            .ok_or_else(|| DatabaseError::not_found("Client", id))?;
        tables.render_client(row)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError> {
        let tables = self.tables.read().await;
        tables.clients.values().map(|row| tables.render_client(row)).collect()
    }

    async fn update_client(&self, id: i64, changes: ClientChanges) -> Result<Client, DatabaseError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Client", id))?;
        if let Some(name) = changes.client_name {
            row.client_name = name;
        }
        row.updated_at = changes.updated_at;
        let row = row.clone();
        tables.render_client(&row)
    }

    async fn delete_client(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.clients.remove(&id).is_none() {
            return Err(DatabaseError::not_found("Client", id));
        }
        tables.projects.retain(|_, p| p.client_id != id);
        Ok(())
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&project.client_id) {
            return Err(DatabaseError::not_found("Client", project.client_id));
        }
        if !tables.users.contains_key(&project.created_by) {
            return Err(DatabaseError::not_found("User", project.created_by));
        }
        let id = Tables::next_id(&mut tables.next_project_id);
        let row = Project {
            id,
            project_name: project.project_name,
            client_id: project.client_id,
            users: Vec::new(),
            created_at: project.created_at,
            updated_at: project.created_at,
            created_by: project.created_by,
        };
        tables.projects.insert(id, row.clone());
        Ok(row)
    }

    async fn get_project(&self, id: i64) -> Result<Project, DatabaseError> {
        self.tables
            .read()
            .await
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("Project", id))
    }

    async fn list_projects_for_client(&self, client_id: i64) -> Result<Vec<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn list_projects_for_user(&self, user_id: i64) -> Result<Vec<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.is_assigned(user_id))
            .cloned()
            .collect())
    }

    async fn update_project(&self, id: i64, changes: ProjectChanges) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Project", id))?;
        if let Some(name) = changes.project_name {
            row.project_name = name;
        }
        row.updated_at = changes.updated_at;
        Ok(row.clone())
    }

    async fn set_project_users(&self, id: i64, user_ids: &[i64]) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(missing) = user_ids.iter().find(|uid| !tables.users.contains_key(*uid)) {
            return Err(DatabaseError::not_found("User", *missing));
        }
        let row = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Project", id))?;
        let mut users = user_ids.to_vec();
        users.sort_unstable();
        users.dedup();
        row.users = users;
        Ok(row.clone())
    }

    async fn delete_project(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .projects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Project", id))
    }
}
