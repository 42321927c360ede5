//! PostgreSQL-based notification store.
//!
//! Table structure (see `migrations/`):
//! - `notifications` - one row per recipient, `vars` as JSON text,
//!   `state` 1 = unread / 0 = read

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::metrics::{NotificationMetrics, StoreMetrics};

use super::entity::{EntityError, NewNotification, Notification, NotificationId, NotificationState};
use super::query::NotificationQuery;
use super::store::{NotificationStore, StoreError};

const BACKEND: &str = "postgres";

const COLUMNS: &str = "id, user_id, template, vars, state, tracking_id, created";

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: String,
    template: String,
    vars: Option<String>,
    state: i16,
    tracking_id: Option<String>,
    created: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = EntityError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification::from_stored(
            row.id,
            row.user_id,
            row.template,
            row.vars.unwrap_or_default(),
            NotificationState::try_from(row.state)?,
            row.tracking_id,
            row.created,
        ))
    }
}

fn into_notifications(rows: Vec<NotificationRow>) -> Result<Vec<Notification>, StoreError> {
    rows.into_iter()
        .map(|row| Notification::try_from(row).map_err(StoreError::from))
        .collect()
}

/// PostgreSQL notification store
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the listing statement for a query
fn build_find_query(query: &NotificationQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM notifications WHERE user_id = ", COLUMNS));
    builder.push_bind(query.user_id.clone());

    let filter = &query.filter;
    if let Some(state) = filter.state {
        builder.push(" AND state = ").push_bind(state.as_i16());
    }
    if let Some(template) = &filter.template {
        builder.push(" AND template = ").push_bind(template.clone());
    }
    if let Some(tracking_id) = &filter.tracking_id {
        builder.push(" AND tracking_id = ").push_bind(tracking_id.clone());
    }
    if let Some(after) = filter.created_after {
        builder.push(" AND created > ").push_bind(after);
    }
    if let Some(before) = filter.created_before {
        builder.push(" AND created < ").push_bind(before);
    }

    let direction = query.order.direction.sql();
    builder
        .push(" ORDER BY ")
        .push(query.order.field.column())
        .push(" ")
        .push(direction)
        .push(", id ")
        .push(direction);

    builder
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn insert_many(
        &self,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "insert_many");

        for draft in &drafts {
            draft.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(drafts.len());

        for draft in &drafts {
            let row: NotificationRow = sqlx::query_as(&format!(
                r#"
                INSERT INTO notifications (user_id, template, vars, state, tracking_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {}
                "#,
                COLUMNS
            ))
            .bind(&draft.user_id)
            .bind(&draft.template)
            .bind(draft.vars.to_text())
            .bind(NotificationState::Unread.as_i16())
            .bind(&draft.tracking_id)
            .fetch_one(&mut *tx)
            .await?;

            rows.push(row);
        }

        tx.commit().await?;

        tracing::debug!(count = rows.len(), "Inserted notifications into PostgreSQL");

        into_notifications(rows)
    }

    async fn find(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "find");

        let rows: Vec<NotificationRow> = build_find_query(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        into_notifications(rows)
    }

    async fn find_one(
        &self,
        user_id: &str,
        id: NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "find_one");

        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM notifications WHERE id = $1 AND user_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Notification::try_from).transpose()?)
    }

    async fn count(
        &self,
        user_id: &str,
        state: Option<NotificationState>,
    ) -> Result<u64, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "count");

        let count: i64 = match state {
            Some(state) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND state = $2",
                )
                .bind(user_id)
                .bind(state.as_i16())
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count.max(0) as u64)
    }

    async fn mark_read(
        &self,
        user_id: &str,
        id: Option<NotificationId>,
    ) -> Result<u64, StoreError> {
        let _timer = StoreMetrics::start_timer(BACKEND, "mark_read");

        let result = match id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE notifications SET state = $1
                    WHERE user_id = $2 AND state = $3 AND id = $4
                    "#,
                )
                .bind(NotificationState::Read.as_i16())
                .bind(user_id)
                .bind(NotificationState::Unread.as_i16())
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE notifications SET state = $1
                    WHERE user_id = $2 AND state = $3
                    "#,
                )
                .bind(NotificationState::Read.as_i16())
                .bind(user_id)
                .bind(NotificationState::Unread.as_i16())
                .execute(&self.pool)
                .await?
            }
        };

        let updated = result.rows_affected();
        NotificationMetrics::record_marked_read(updated);

        Ok(updated)
    }
}
