use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::health::health;
use super::metrics::prometheus_metrics;
use super::notifications::{
    count_notifications, get_notification, list_notifications, mark_all_read, mark_read,
};
use super::notify::send_notification;
use super::templates::list_templates;
use super::users::{count_user_notifications, list_user_notifications, mark_user_read};

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Caller-scoped endpoints, authenticated by bearer token
    let caller_routes = Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/count", get(count_notifications))
        .route("/notifications/read", post(mark_all_read))
        .route("/notifications/{id}", get(get_notification))
        .route("/notifications/{id}/read", post(mark_read));

    // Administrative endpoints, protected by API key
    let admin_routes = Router::new()
        .route("/users/{user_id}/notifications", get(list_user_notifications))
        .route(
            "/users/{user_id}/notifications/count",
            get(count_user_notifications),
        )
        .route("/users/{user_id}/notifications/read", post(mark_user_read))
        .route("/notify", post(send_notification))
        .route("/templates", get(list_templates))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api/v1", caller_routes.merge(admin_routes))
}
