//! API layer - HTTP endpoint handlers organized by domain.

mod extract;
mod health;
mod metrics;
mod notifications;
mod notify;
mod routes;
mod templates;
mod users;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health;
pub use metrics::prometheus_metrics;
pub use notifications::{
    count_notifications, get_notification, list_notifications, mark_all_read, mark_read,
    CountParams, CountResponse, ListParams, MarkReadResponse, NotificationListResponse,
};
pub use notify::{send_notification, NotifyResponse};
pub use routes::api_routes;
pub use templates::{list_templates, TemplateListResponse};
pub use users::{count_user_notifications, list_user_notifications, mark_user_read, MarkReadParams};
