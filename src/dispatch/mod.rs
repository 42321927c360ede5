//! Notification dispatch.
//!
//! This module provides:
//! - `NotificationManager`: resolves recipients, persists one notification per
//!   recipient under a shared tracking id, and hands them to delivery channels
//! - `UserDirectory`: role → user lookup (PostgreSQL users table or in-memory)
//! - `DeliveryChannel`: outbound hand-off, e.g. Redis Pub/Sub

mod channel;
mod directory;
mod manager;
mod redis_channel;

use thiserror::Error;

use crate::notification::StoreError;

pub use channel::{ChannelError, ChannelMessage, DeliveryChannel};
pub use directory::{DirectoryError, MemoryUserDirectory, PostgresUserDirectory, UserDirectory};
pub use manager::{DispatchReceipt, Dispatcher, NotificationManager, NotifyRequest};
pub use redis_channel::RedisChannel;

/// Message shown to the end user when a dispatch fails
pub const DISPATCH_FAILED_MESSAGE: &str = "An error occurred sending the notifications";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("template is required")]
    MissingTemplate,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("No recipients resolved")]
    NoRecipients,

    #[error("Recipient lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Failed to store notifications: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// Label used for the dispatch result metric
    pub fn metric_label(&self) -> &'static str {
        match self {
            DispatchError::MissingTemplate => "missing_template",
            DispatchError::UnknownTemplate(_) => "unknown_template",
            DispatchError::NoRecipients => "no_recipients",
            DispatchError::Directory(_) => "directory_error",
            DispatchError::Store(_) => "store_error",
        }
    }
}
