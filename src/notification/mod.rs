//! Notification records and their persistence.

mod entity;
mod factory;
mod memory_store;
mod postgres_store;
mod query;
mod store;

pub use entity::{
    EntityError, NewNotification, Notification, NotificationId, NotificationState,
    NotificationView, Vars,
};
pub use factory::create_notification_store;
pub use memory_store::MemoryNotificationStore;
pub use postgres_store::PostgresNotificationStore;
pub use query::{
    Direction, ListOptions, NotificationFilter, NotificationQuery, Order, OrderField,
};
pub use store::{NotificationStore, StoreError};
