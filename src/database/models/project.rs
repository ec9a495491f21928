use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub client_id: i64,
    /// Assigned user ids, ascending
    pub users: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i64,
}

impl Project {
    pub fn is_assigned(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }
}

/// Insert payload. Projects start with an empty assigned-user set.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub project_name: String,
    pub client_id: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProjectChanges {
    pub project_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}
