//! Administrative notification endpoints addressing any user.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::notification::NotificationId;
use crate::server::AppState;

use super::extract::{ApiPath, ApiQuery};
use super::notifications::{
    list_for, parse_state, CountParams, CountResponse, ListParams, MarkReadResponse,
    NotificationListResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct MarkReadParams {
    pub id: Option<NotificationId>,
}

/// GET /api/v1/users/{user_id}/notifications
#[tracing::instrument(name = "http.list_user_notifications", skip(state))]
pub async fn list_user_notifications(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<NotificationListResponse>> {
    let caller = Caller::anonymous();
    Ok(Json(list_for(&state, &caller, Some(&user_id), &params).await?))
}

/// GET /api/v1/users/{user_id}/notifications/count
#[tracing::instrument(name = "http.count_user_notifications", skip(state))]
pub async fn count_user_notifications(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<CountParams>,
) -> Result<Json<CountResponse>> {
    let state_filter = parse_state(params.state.as_deref())?;
    let count = state
        .notifier
        .count_notifications(&Caller::anonymous(), Some(&user_id), state_filter)
        .await?;

    Ok(Json(CountResponse { count }))
}

/// POST /api/v1/users/{user_id}/notifications/read[?id=]
#[tracing::instrument(name = "http.mark_user_read", skip(state))]
pub async fn mark_user_read(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<MarkReadParams>,
) -> Result<Json<MarkReadResponse>> {
    let updated = state
        .notifier
        .mark_as_read(&Caller::anonymous(), params.id, Some(&user_id))
        .await?;

    Ok(Json(MarkReadResponse { updated }))
}
