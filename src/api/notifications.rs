//! Notification endpoints for the authenticated caller.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::{AppError, Result};
use crate::notification::{
    Direction, ListOptions, NotificationFilter, NotificationId, NotificationState,
    NotificationView, Order, OrderField,
};
use crate::server::AppState;

use super::extract::{ApiPath, ApiQuery};

/// Query parameters of a notification listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub state: Option<String>,
    pub template: Option<String>,
    pub tracking_id: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub order: Option<String>,
    pub direction: Option<String>,
}

impl ListParams {
    pub fn state(&self) -> Result<Option<NotificationState>> {
        parse_state(self.state.as_deref())
    }

    pub fn options(&self) -> Result<ListOptions> {
        let filter = NotificationFilter {
            state: None,
            template: self.template.clone(),
            tracking_id: self.tracking_id.clone(),
            created_after: self.created_after,
            created_before: self.created_before,
        };

        let order = match (&self.order, &self.direction) {
            (None, None) => None,
            (field, direction) => {
                let field = match field {
                    Some(f) => f.parse::<OrderField>().map_err(AppError::Validation)?,
                    None => OrderField::default(),
                };
                let direction = match direction {
                    Some(d) => d.parse::<Direction>().map_err(AppError::Validation)?,
                    None => Direction::default(),
                };
                Some(Order::new(field, direction))
            }
        };

        Ok(ListOptions { filter, order })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
    pub state: Option<String>,
}

pub(super) fn parse_state(state: Option<&str>) -> Result<Option<NotificationState>> {
    state
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<NotificationState>().map_err(AppError::Validation))
        .transpose()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationView>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

pub(super) async fn list_for(
    state: &AppState,
    caller: &Caller,
    user_id: Option<&str>,
    params: &ListParams,
) -> Result<NotificationListResponse> {
    let notifications = state
        .notifier
        .list_notifications(caller, user_id, params.state()?, params.options()?)
        .await?;

    let notifications = state.notifier.render_all(&notifications);
    let total = notifications.len();
    Ok(NotificationListResponse {
        notifications,
        total,
    })
}

/// GET /api/v1/notifications - List the caller's notifications
#[tracing::instrument(name = "http.list_notifications", skip(state, caller))]
pub async fn list_notifications(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<NotificationListResponse>> {
    Ok(Json(list_for(&state, &caller, None, &params).await?))
}

/// GET /api/v1/notifications/count - Count the caller's notifications
#[tracing::instrument(name = "http.count_notifications", skip(state, caller))]
pub async fn count_notifications(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<CountParams>,
) -> Result<Json<CountResponse>> {
    let state_filter = parse_state(params.state.as_deref())?;
    let count = state
        .notifier
        .count_notifications(&caller, None, state_filter)
        .await?;

    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/notifications/{id} - Get one of the caller's notifications
#[tracing::instrument(name = "http.get_notification", skip(state, caller))]
pub async fn get_notification(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<NotificationView>> {
    let notification = state
        .notifier
        .find_notification(&caller, None, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    Ok(Json(state.notifier.render(&notification)))
}

/// POST /api/v1/notifications/read - Mark all of the caller's notifications read
#[tracing::instrument(name = "http.mark_all_read", skip(state, caller))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<MarkReadResponse>> {
    let updated = state.notifier.mark_as_read(&caller, None, None).await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// POST /api/v1/notifications/{id}/read - Mark one notification read
#[tracing::instrument(name = "http.mark_read", skip(state, caller))]
pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<MarkReadResponse>> {
    let updated = state.notifier.mark_as_read(&caller, Some(id), None).await?;
    Ok(Json(MarkReadResponse { updated }))
}
