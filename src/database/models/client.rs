use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client row joined with its creator's username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i64,
    pub created_by_username: String,
}

/// Insert payload. `created_at` doubles as the initial `updated_at`.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub client_name: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClientChanges {
    pub client_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}
