//! In-memory notification store.
//!
//! Rows live behind a single `RwLock`, so every operation (including the
//! batch mark-as-read) is atomic. Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::metrics::{NotificationMetrics, StoreMetrics};

use super::entity::{NewNotification, Notification, NotificationId, NotificationState};
use super::query::NotificationQuery;
use super::store::{NotificationStore, StoreError};

const BACKEND: &str = "memory";

#[derive(Default)]
struct MemoryRows {
    rows: Vec<Notification>,
    last_id: NotificationId,
}

/// In-memory notification store
#[derive(Default)]
pub struct MemoryNotificationStore {
    inner: RwLock<MemoryRows>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all users
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn insert_many(
        &self,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "insert_many");

        // Validate everything first so a bad draft leaves the store untouched
        for draft in &drafts {
            draft.validate()?;
        }

        let mut inner = self.inner.write().await;
        let created = Utc::now();
        let mut inserted = Vec::with_capacity(drafts.len());

        for draft in drafts {
            inner.last_id += 1;
            let notification = Notification::from_new(inner.last_id, draft, created);
            inner.rows.push(notification.clone());
            inserted.push(notification);
        }

        tracing::debug!(count = inserted.len(), "Inserted notifications into memory store");

        Ok(inserted)
    }

    async fn find(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "find");

        let inner = self.inner.read().await;
        let mut found: Vec<Notification> = inner
            .rows
            .iter()
            .filter(|n| query.matches(n))
            .cloned()
            .collect();

        found.sort_by(|a, b| query.order.compare(a, b));

        Ok(found)
    }

    async fn find_one(
        &self,
        user_id: &str,
        id: NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "find_one");

        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .find(|n| n.id() == id && n.user_id() == user_id)
            .cloned())
    }

    async fn count(
        &self,
        user_id: &str,
        state: Option<NotificationState>,
    ) -> Result<u64, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "count");

        let inner = self.inner.read().await;
        let count = inner
            .rows
            .iter()
            .filter(|n| n.user_id() == user_id)
            .filter(|n| state.map_or(true, |s| n.state() == s))
            .count();

        Ok(count as u64)
    }

    async fn mark_read(
        &self,
        user_id: &str,
        id: Option<NotificationId>,
    ) -> Result<u64, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "mark_read");

        let mut inner = self.inner.write().await;
        let mut updated = 0u64;

        for notification in inner
            .rows
            .iter_mut()
            .filter(|n| n.user_id() == user_id)
            .filter(|n| id.map_or(true, |id| n.id() == id))
        {
            if notification.mark_read() {
                updated += 1;
            }
        }

        NotificationMetrics::record_marked_read(updated);

        Ok(updated)
    }
}
