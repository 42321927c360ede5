//! Notification send endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::dispatch::NotifyRequest;
use crate::error::Result;
use crate::server::AppState;

use super::extract::ApiJson;

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub tracking_id: String,
}

/// POST /api/v1/notify - Send a notification to users and roles
#[tracing::instrument(
    name = "http.send_notification",
    skip(state, request),
    fields(template = %request.template)
)]
pub async fn send_notification(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NotifyRequest>,
) -> Result<(StatusCode, Json<NotifyResponse>)> {
    let tracking_id = state.notifier.notify(request).await?;

    Ok((StatusCode::CREATED, Json(NotifyResponse { tracking_id })))
}
