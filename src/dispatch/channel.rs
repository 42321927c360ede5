//! Delivery channel abstraction.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::notification::NotificationView;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel unavailable: {0}")]
    Unavailable(String),
}

/// Message published to external delivery workers
#[derive(Debug, Serialize)]
pub struct ChannelMessage<'a> {
    pub event: &'static str,
    pub notification: &'a NotificationView,
}

impl<'a> ChannelMessage<'a> {
    pub const CREATED: &'static str = "notification.created";

    pub fn created(notification: &'a NotificationView) -> Self {
        Self {
            event: Self::CREATED,
            notification,
        }
    }
}

/// Hands a stored, rendered notification to an outside delivery mechanism
/// (email, push, ...).
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Channel name used in logs and metrics
    fn name(&self) -> &str;

    async fn deliver(&self, notification: &NotificationView) -> Result<(), ChannelError>;
}
