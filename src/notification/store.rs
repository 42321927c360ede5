//! Backend trait for notification persistence.
//!
//! This module defines the abstraction layer over notification storage,
//! allowing the PostgreSQL and in-memory implementations to be used
//! interchangeably.

use async_trait::async_trait;
use thiserror::Error;

use super::entity::{EntityError, NewNotification, Notification, NotificationId, NotificationState};
use super::query::NotificationQuery;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A draft or stored row violates the record invariants
    #[error("Invalid notification: {0}")]
    Invalid(#[from] EntityError),
}

/// Backend trait for notification storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single store is shared by all
/// request handlers.
///
/// # Atomicity
///
/// `insert_many` persists all drafts or none. `mark_read` is a single
/// conditional update: either every matching row transitions or none does.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Backend type identifier
    fn backend_name(&self) -> &'static str;

    /// Insert drafts as UNREAD notifications, returning the stored rows in
    /// draft order.
    async fn insert_many(
        &self,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, StoreError>;

    /// List notifications matching the query, in query order.
    async fn find(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError>;

    /// Fetch one notification owned by `user_id`.
    async fn find_one(
        &self,
        user_id: &str,
        id: NotificationId,
    ) -> Result<Option<Notification>, StoreError>;

    /// Count notifications owned by `user_id`, optionally narrowed by state.
    async fn count(
        &self,
        user_id: &str,
        state: Option<NotificationState>,
    ) -> Result<u64, StoreError>;

    /// Transition UNREAD notifications of `user_id` to READ: the single
    /// notification `id` when given, otherwise all of them.
    ///
    /// # Returns
    ///
    /// The number of notifications that changed state.
    async fn mark_read(
        &self,
        user_id: &str,
        id: Option<NotificationId>,
    ) -> Result<u64, StoreError>;
}
