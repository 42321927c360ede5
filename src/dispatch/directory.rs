//! Role → user resolution for dispatch recipients.

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid users table name: {0}")]
    InvalidTable(String),
}

/// Looks up the users holding any of a set of roles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// User ids holding any of `roles`, without duplicates.
    async fn users_in_roles(&self, roles: &[String]) -> Result<Vec<String>, DirectoryError>;
}

/// In-memory role assignments
#[derive(Default)]
pub struct MemoryUserDirectory {
    roles: DashMap<String, Vec<String>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `role` to `user_id`
    pub fn assign(&self, user_id: impl Into<String>, role: impl Into<String>) {
        let user_id = user_id.into();
        let mut members = self.roles.entry(role.into()).or_default();
        if !members.contains(&user_id) {
            members.push(user_id);
        }
    }

    pub fn with_assignment(self, user_id: impl Into<String>, role: impl Into<String>) -> Self {
        self.assign(user_id, role);
        self
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn users_in_roles(&self, roles: &[String]) -> Result<Vec<String>, DirectoryError> {
        let mut users: Vec<String> = Vec::new();

        for role in roles {
            if let Some(members) = self.roles.get(role) {
                for user in members.iter() {
                    if !users.contains(user) {
                        users.push(user.clone());
                    }
                }
            }
        }

        Ok(users)
    }
}

/// Users table lookup: `SELECT id FROM <table> WHERE role_id = ANY(roles)`
pub struct PostgresUserDirectory {
    pool: PgPool,
    users_table: String,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool, users_table: impl Into<String>) -> Result<Self, DirectoryError> {
        let users_table = users_table.into();
        if !is_valid_table_name(&users_table) {
            return Err(DirectoryError::InvalidTable(users_table));
        }

        Ok(Self { pool, users_table })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn users_in_roles(&self, roles: &[String]) -> Result<Vec<String>, DirectoryError> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let users: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT id::text FROM {} WHERE role_id::text = ANY($1)",
            self.users_table
        ))
        .bind(roles)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            roles = ?roles,
            users = users.len(),
            "Resolved role recipients"
        );

        Ok(users)
    }
}

/// `table` or `schema.table`, each part a plain SQL identifier
fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
