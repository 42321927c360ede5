//! Notifier facade.
//!
//! The operations application code calls: list, count and mark notifications
//! as read for a user, and send new notifications through the dispatcher.
//! Every user-scoped operation takes an explicit `Caller`; an omitted user id
//! falls back to the caller's own id.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::{AuthError, Caller};
use crate::dispatch::{DispatchError, Dispatcher, NotifyRequest};
use crate::notification::{
    ListOptions, Notification, NotificationFilter, NotificationId, NotificationQuery,
    NotificationState, NotificationStore, NotificationView, StoreError,
};
use crate::template::TemplateRegistry;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub type NotifierResult<T> = Result<T, NotifierError>;

#[derive(Clone)]
pub struct NotifierService {
    store: Arc<dyn NotificationStore>,
    dispatcher: Arc<dyn Dispatcher>,
    templates: Arc<TemplateRegistry>,
}

impl NotifierService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        dispatcher: Arc<dyn Dispatcher>,
        templates: Arc<TemplateRegistry>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            templates,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Notifications of a user, newest first.
    ///
    /// `options.filter` is merged over the `state` condition key by key, so a
    /// state given there replaces `state`. `options.order` replaces the
    /// default order.
    #[tracing::instrument(name = "notifier.list", skip(self, caller, options))]
    pub async fn list_notifications(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        state: Option<NotificationState>,
        options: ListOptions,
    ) -> NotifierResult<Vec<Notification>> {
        let user_id = caller.resolve_user(user_id)?;

        let base = NotificationFilter {
            state,
            ..NotificationFilter::default()
        };
        let query = NotificationQuery::for_user(user_id)
            .filter(base.merge(options.filter))
            .order(options.order.unwrap_or_default());

        let notifications = self.store.find(&query).await?;
        tracing::debug!(
            user_id = %user_id,
            count = notifications.len(),
            "Listed notifications"
        );
        Ok(notifications)
    }

    pub async fn notifications(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        state: Option<NotificationState>,
    ) -> NotifierResult<Vec<Notification>> {
        self.list_notifications(caller, user_id, state, ListOptions::default())
            .await
    }

    /// All notifications regardless of state; a state in `options` is ignored.
    pub async fn all_notifications_by(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        options: ListOptions,
    ) -> NotifierResult<Vec<Notification>> {
        let options = ListOptions {
            filter: options.filter.without_state(),
            order: options.order,
        };
        self.list_notifications(caller, user_id, None, options).await
    }

    pub async fn read_notifications_by(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        options: ListOptions,
    ) -> NotifierResult<Vec<Notification>> {
        self.notifications_in_state(caller, user_id, NotificationState::Read, options)
            .await
    }

    pub async fn unread_notifications_by(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        options: ListOptions,
    ) -> NotifierResult<Vec<Notification>> {
        self.notifications_in_state(caller, user_id, NotificationState::Unread, options)
            .await
    }

    async fn notifications_in_state(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        state: NotificationState,
        options: ListOptions,
    ) -> NotifierResult<Vec<Notification>> {
        let options = ListOptions {
            filter: options.filter.merge(NotificationFilter::with_state(state)),
            order: options.order,
        };
        self.list_notifications(caller, user_id, Some(state), options)
            .await
    }

    #[tracing::instrument(name = "notifier.count", skip(self, caller))]
    pub async fn count_notifications(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        state: Option<NotificationState>,
    ) -> NotifierResult<u64> {
        let user_id = caller.resolve_user(user_id)?;
        Ok(self.store.count(user_id, state).await?)
    }

    /// One notification owned by the user
    pub async fn find_notification(
        &self,
        caller: &Caller,
        user_id: Option<&str>,
        id: NotificationId,
    ) -> NotifierResult<Option<Notification>> {
        let user_id = caller.resolve_user(user_id)?;
        Ok(self.store.find_one(user_id, id).await?)
    }

    /// Mark notification `id`, or every unread notification when `id` is
    /// `None`, as read.
    ///
    /// # Returns
    ///
    /// The number of notifications that changed state. Zero is not an error:
    /// the notification may already be read or belong to another user.
    #[tracing::instrument(name = "notifier.mark_as_read", skip(self, caller))]
    pub async fn mark_as_read(
        &self,
        caller: &Caller,
        id: Option<NotificationId>,
        user_id: Option<&str>,
    ) -> NotifierResult<u64> {
        let user_id = caller.resolve_user(user_id)?;
        let updated = self.store.mark_read(user_id, id).await?;

        tracing::info!(user_id = %user_id, updated = updated, "Marked notifications read");
        Ok(updated)
    }

    /// Send a notification to users and roles, returning its tracking id.
    pub async fn notify(&self, request: NotifyRequest) -> NotifierResult<String> {
        let receipt = self.dispatcher.notify(request).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to send notifications");
            e
        })?;
        Ok(receipt.tracking_id)
    }

    pub fn render(&self, notification: &Notification) -> NotificationView {
        notification.render(&self.templates)
    }

    pub fn render_all(&self, notifications: &[Notification]) -> Vec<NotificationView> {
        notifications.iter().map(|n| self.render(n)).collect()
    }
}

impl std::fmt::Debug for NotifierService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierService")
            .field("store", &self.store.backend_name())
            .field("templates", &self.templates.len())
            .finish()
    }
}
