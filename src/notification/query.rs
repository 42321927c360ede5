//! Filtering and ordering of notification listings.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Notification, NotificationState};

/// Extra conditions applied on top of the owner condition.
///
/// Merging is per key: a key set on the overriding filter replaces the
/// same key of the base filter, unset keys keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub state: Option<NotificationState>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_before: Option<DateTime<Utc>>,
}

impl NotificationFilter {
    pub fn with_state(state: NotificationState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn merge(self, over: NotificationFilter) -> Self {
        Self {
            state: over.state.or(self.state),
            template: over.template.or(self.template),
            tracking_id: over.tracking_id.or(self.tracking_id),
            created_after: over.created_after.or(self.created_after),
            created_before: over.created_before.or(self.created_before),
        }
    }

    /// Drop the state condition
    pub fn without_state(mut self) -> Self {
        self.state = None;
        self
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(state) = self.state {
            if notification.state() != state {
                return false;
            }
        }
        if let Some(template) = &self.template {
            if notification.template() != template {
                return false;
            }
        }
        if let Some(tracking_id) = &self.tracking_id {
            if notification.tracking_id() != Some(tracking_id.as_str()) {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if notification.created() <= after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if notification.created() >= before {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    #[default]
    Created,
    Id,
    State,
    Template,
}

impl OrderField {
    pub fn column(self) -> &'static str {
        match self {
            OrderField::Created => "created",
            OrderField::Id => "id",
            OrderField::State => "state",
            OrderField::Template => "template",
        }
    }
}

impl FromStr for OrderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderField::Created),
            "id" => Ok(OrderField::Id),
            "state" => Ok(OrderField::State),
            "template" => Ok(OrderField::Template),
            other => Err(format!("cannot order by '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Listing order. Defaults to newest first; ties are broken by id in the
/// same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub field: OrderField,
    #[serde(default)]
    pub direction: Direction,
}

impl Order {
    pub fn new(field: OrderField, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &Notification, b: &Notification) -> Ordering {
        let primary = match self.field {
            OrderField::Created => a.created().cmp(&b.created()),
            OrderField::Id => a.id().cmp(&b.id()),
            OrderField::State => a.state().as_i16().cmp(&b.state().as_i16()),
            OrderField::Template => a.template().cmp(b.template()),
        };
        let ordering = primary.then_with(|| a.id().cmp(&b.id()));

        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// A fully resolved listing query for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub user_id: String,
    pub filter: NotificationFilter,
    pub order: Order,
}

impl NotificationQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            filter: NotificationFilter::default(),
            order: Order::default(),
        }
    }

    pub fn filter(mut self, filter: NotificationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        notification.user_id() == self.user_id && self.filter.matches(notification)
    }
}

/// Caller-supplied listing options: extra conditions and an order override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default)]
    pub filter: NotificationFilter,
    #[serde(default)]
    pub order: Option<Order>,
}

impl ListOptions {
    pub fn filter(filter: NotificationFilter) -> Self {
        Self {
            filter,
            order: None,
        }
    }

    pub fn ordered(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }
}
