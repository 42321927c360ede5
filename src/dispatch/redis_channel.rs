//! Redis Pub/Sub delivery channel.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::notification::NotificationView;

use super::channel::{ChannelError, ChannelMessage, DeliveryChannel};

/// Publishes every created notification as JSON on a Redis channel
pub struct RedisChannel {
    connection: ConnectionManager,
    channel: String,
}

impl RedisChannel {
    pub async fn connect(config: &RedisConfig) -> Result<Self, ChannelError> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!(channel = %config.channel, "Redis delivery channel connected");

        Ok(Self {
            connection,
            channel: config.channel.clone(),
        })
    }
}

#[async_trait]
impl DeliveryChannel for RedisChannel {
    fn name(&self) -> &str {
        "redis"
    }

    async fn deliver(&self, notification: &NotificationView) -> Result<(), ChannelError> {
        let payload = serde_json::to_string(&ChannelMessage::created(notification))?;

        let mut conn = self.connection.clone();
        let receivers: i64 = conn.publish(&self.channel, payload).await?;

        tracing::trace!(
            notification_id = notification.id,
            channel = %self.channel,
            receivers = receivers,
            "Published notification"
        );

        Ok(())
    }
}
