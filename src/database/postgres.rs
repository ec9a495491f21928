use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Client, ClientChanges, NewClient, NewProject, Project, ProjectChanges, User,
};
use crate::database::repository::RecordStore;

const USER_COLUMNS: &str = "id, username, created_at";

/// Client columns joined with the creator's username; expects the row alias `c`
const CLIENT_SELECT: &str = "SELECT c.id, c.client_name, c.created_at, c.updated_at, c.created_by, \
     u.username AS created_by_username \
     FROM clients c JOIN users u ON u.id = c.created_by";

/// Project columns plus the aggregated assignment set; expects the row alias `p`
const PROJECT_SELECT: &str = "SELECT p.id, p.project_name, p.client_id, p.created_at, p.updated_at, p.created_by, \
     ARRAY(SELECT pu.user_id FROM project_users pu WHERE pu.project_id = p.id ORDER BY pu.user_id) AS users \
     FROM projects p";

/// PostgreSQL-backed record store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map foreign-key (23503) and unique (23505) violations to domain errors
fn classify(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => {
                let constraint = db_err.constraint().unwrap_or_default();
                let entity = if constraint.contains("client_id") { "Client" } else { "User" };
                return DatabaseError::NotFound(format!("Referenced {} does not exist", entity));
            }
            Some("23505") => {
                return DatabaseError::Conflict(db_err.message().to_string());
            }
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl RecordStore for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_user(&self, username: &str) -> Result<User, DatabaseError> {
        let sql = format!("INSERT INTO users (username) VALUES ($1) RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn insert_client(&self, client: NewClient) -> Result<Client, DatabaseError> {
        let sql = "WITH c AS (
                INSERT INTO clients (client_name, created_at, updated_at, created_by)
                VALUES ($1, $2, $2, $3)
                RETURNING *
            )
            SELECT c.id, c.client_name, c.created_at, c.updated_at, c.created_by,
                   u.username AS created_by_username
            FROM c JOIN users u ON u.id = c.created_by";
        sqlx::query_as::<_, Client>(sql)
            .bind(&client.client_name)
            .bind(client.created_at)
            .bind(client.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn get_client(&self, id: i64) -> Result<Client, DatabaseError> {
        let sql = format!("{CLIENT_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError> {
        let sql = format!("{CLIENT_SELECT} ORDER BY c.id");
        let clients = sqlx::query_as::<_, Client>(&sql).fetch_all(&self.pool).await?;
        Ok(clients)
    }

    async fn update_client(&self, id: i64, changes: ClientChanges) -> Result<Client, DatabaseError> {
        let sql = "WITH c AS (
                UPDATE clients
                SET client_name = COALESCE($2, client_name), updated_at = $3
                WHERE id = $1
                RETURNING *
            )
            SELECT c.id, c.client_name, c.created_at, c.updated_at, c.created_by,
                   u.username AS created_by_username
            FROM c JOIN users u ON u.id = c.created_by";
        sqlx::query_as::<_, Client>(sql)
            .bind(id)
            .bind(&changes.client_name)
            .bind(changes.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    async fn delete_client(&self, id: i64) -> Result<(), DatabaseError> {
        // projects and their assignments go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", id));
        }
        Ok(())
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let sql = "INSERT INTO projects (project_name, client_id, created_at, updated_at, created_by)
             VALUES ($1, $2, $3, $3, $4)
             RETURNING id, project_name, client_id, created_at, updated_at, created_by,
                       '{}'::BIGINT[] AS users";
        sqlx::query_as::<_, Project>(sql)
            .bind(&project.project_name)
            .bind(project.client_id)
            .bind(project.created_at)
            .bind(project.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn get_project(&self, id: i64) -> Result<Project, DatabaseError> {
        let sql = format!("{PROJECT_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Project", id))
    }

    async fn list_projects_for_client(&self, client_id: i64) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!("{PROJECT_SELECT} WHERE p.client_id = $1 ORDER BY p.id");
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn list_projects_for_user(&self, user_id: i64) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "{PROJECT_SELECT} WHERE EXISTS (
                SELECT 1 FROM project_users pu WHERE pu.project_id = p.id AND pu.user_id = $1
            ) ORDER BY p.id"
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn update_project(&self, id: i64, changes: ProjectChanges) -> Result<Project, DatabaseError> {
        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE projects
             SET project_name = COALESCE($2, project_name), updated_at = $3
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&changes.project_name)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_project(id).await,
            None => Err(DatabaseError::not_found("Project", id)),
        }
    }

    async fn set_project_users(&self, id: i64, user_ids: &[i64]) -> Result<Project, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::not_found("Project", id));
        }

        sqlx::query("DELETE FROM project_users WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !user_ids.is_empty() {
            sqlx::query(
                "INSERT INTO project_users (project_id, user_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(user_ids.to_vec())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        tx.commit().await?;
        self.get_project(id).await
    }

    async fn delete_project(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Project", id));
        }
        Ok(())
    }
}
