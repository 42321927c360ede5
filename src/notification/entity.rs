//! Notification record and its derived fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::template::{TemplateRegistry, TemplateResult};

/// Store-assigned notification identifier
pub type NotificationId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("user_id is required")]
    MissingUserId,

    #[error("template is required")]
    MissingTemplate,

    #[error("Invalid state value: {0}")]
    InvalidState(i16),
}

/// Read state of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationState {
    #[default]
    Unread,
    Read,
}

impl NotificationState {
    pub const UNREAD_STATUS: i16 = 1;
    pub const READ_STATUS: i16 = 0;

    /// Stored column value
    pub fn as_i16(self) -> i16 {
        match self {
            NotificationState::Unread => Self::UNREAD_STATUS,
            NotificationState::Read => Self::READ_STATUS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationState::Unread => "unread",
            NotificationState::Read => "read",
        }
    }
}

impl TryFrom<i16> for NotificationState {
    type Error = EntityError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            Self::UNREAD_STATUS => Ok(NotificationState::Unread),
            Self::READ_STATUS => Ok(NotificationState::Read),
            other => Err(EntityError::InvalidState(other)),
        }
    }
}

impl FromStr for NotificationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unread" | "1" => Ok(NotificationState::Unread),
            "read" | "0" => Ok(NotificationState::Read),
            other => Err(format!("unknown notification state '{}'", other)),
        }
    }
}

impl fmt::Display for NotificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substitution values of a notification.
///
/// Stored as JSON text. Text that does not parse to a JSON object is kept
/// as-is in `Raw` and renders no substitutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vars {
    Map(Map<String, Value>),
    Raw(String),
}

impl Default for Vars {
    fn default() -> Self {
        Vars::Map(Map::new())
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(map: Map<String, Value>) -> Self {
        Vars::Map(map)
    }
}

impl Vars {
    /// Parse stored text
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Vars::Map(map),
            _ => Vars::Raw(text.to_string()),
        }
    }

    /// Text form persisted by the store
    pub fn to_text(&self) -> String {
        match self {
            Vars::Map(map) => Value::Object(map.clone()).to_string(),
            Vars::Raw(raw) => raw.clone(),
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Vars::Map(map) => Some(map),
            Vars::Raw(_) => None,
        }
    }
}

/// Assignable fields of a new notification.
///
/// `state`, `id` and `created` are owned by the store; if present in
/// deserialized input they are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub template: String,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub tracking_id: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            template: template.into(),
            vars: Vars::default(),
            tracking_id: None,
        }
    }

    pub fn vars(mut self, vars: impl Into<Vars>) -> Self {
        self.vars = vars.into();
        self
    }

    pub fn tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), EntityError> {
        if self.user_id.trim().is_empty() {
            return Err(EntityError::MissingUserId);
        }
        if self.template.trim().is_empty() {
            return Err(EntityError::MissingTemplate);
        }
        Ok(())
    }
}

/// A persisted notification.
///
/// Title, body and the read flags are computed on access and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    id: NotificationId,
    user_id: String,
    template: String,
    vars: String,
    state: NotificationState,
    tracking_id: Option<String>,
    created: DateTime<Utc>,
}

impl Notification {
    /// Materialize a stored row
    pub fn from_stored(
        id: NotificationId,
        user_id: String,
        template: String,
        vars: String,
        state: NotificationState,
        tracking_id: Option<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            template,
            vars,
            state,
            tracking_id,
            created,
        }
    }

    /// Materialize a freshly inserted draft
    pub fn from_new(id: NotificationId, draft: NewNotification, created: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            template: draft.template,
            vars: draft.vars.to_text(),
            state: NotificationState::Unread,
            tracking_id: draft.tracking_id,
            created,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn vars(&self) -> Vars {
        Vars::from_text(&self.vars)
    }

    /// Stored text form of `vars`
    pub fn vars_text(&self) -> &str {
        &self.vars
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id.as_deref()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn is_unread(&self) -> bool {
        self.state == NotificationState::Unread
    }

    pub fn is_read(&self) -> bool {
        self.state == NotificationState::Read
    }

    /// Transition to read. Returns whether the state changed.
    pub(crate) fn mark_read(&mut self) -> bool {
        let changed = self.is_unread();
        self.state = NotificationState::Read;
        changed
    }

    pub fn try_title(&self, templates: &TemplateRegistry) -> TemplateResult<String> {
        templates.render_title(&self.template, &self.substitutions())
    }

    pub fn try_body(&self, templates: &TemplateRegistry) -> TemplateResult<String> {
        templates.render_body(&self.template, &self.substitutions())
    }

    /// Rendered title, or an empty string when the template is not configured
    pub fn title(&self, templates: &TemplateRegistry) -> String {
        self.try_title(templates).unwrap_or_else(|e| {
            tracing::debug!(notification_id = self.id, error = %e, "Rendering empty title");
            String::new()
        })
    }

    /// Rendered body, or an empty string when the template is not configured
    pub fn body(&self, templates: &TemplateRegistry) -> String {
        self.try_body(templates).unwrap_or_else(|e| {
            tracing::debug!(notification_id = self.id, error = %e, "Rendering empty body");
            String::new()
        })
    }

    /// Serializable view with all derived fields resolved
    pub fn render(&self, templates: &TemplateRegistry) -> NotificationView {
        NotificationView {
            id: self.id,
            user_id: self.user_id.clone(),
            template: self.template.clone(),
            vars: self.vars(),
            state: self.state,
            tracking_id: self.tracking_id.clone(),
            created: self.created,
            title: self.title(templates),
            body: self.body(templates),
            unread: self.is_unread(),
            read: self.is_read(),
        }
    }

    fn substitutions(&self) -> Map<String, Value> {
        match self.vars() {
            Vars::Map(map) => map,
            Vars::Raw(_) => Map::new(),
        }
    }
}

/// Notification as returned to clients and delivery channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: NotificationId,
    pub user_id: String,
    pub template: String,
    pub vars: Vars,
    pub state: NotificationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    pub created: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub unread: bool,
    pub read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::default().with_template("greeting", "Hello {name}", "Welcome, {name}!")
    }

    fn stored(template: &str, vars: &str, state: NotificationState) -> Notification {
        Notification::from_stored(
            1,
            "user-1".to_string(),
            template.to_string(),
            vars.to_string(),
            state,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_state_column_values() {
        assert_eq!(NotificationState::Unread.as_i16(), 1);
        assert_eq!(NotificationState::Read.as_i16(), 0);
        assert_eq!(NotificationState::try_from(1), Ok(NotificationState::Unread));
        assert_eq!(NotificationState::try_from(0), Ok(NotificationState::Read));
        assert_eq!(
            NotificationState::try_from(2),
            Err(EntityError::InvalidState(2))
        );
    }

    #[test]
    fn test_state_from_str() {
        assert_eq!("unread".parse(), Ok(NotificationState::Unread));
        assert_eq!("READ".parse(), Ok(NotificationState::Read));
        assert_eq!("1".parse(), Ok(NotificationState::Unread));
        assert!("maybe".parse::<NotificationState>().is_err());
    }

    #[test]
    fn test_read_flags_follow_state() {
        let mut notification = stored("greeting", "{}", NotificationState::Unread);
        assert!(notification.is_unread());
        assert!(!notification.is_read());

        assert!(notification.mark_read());
        assert!(!notification.is_unread());
        assert!(notification.is_read());

        // Idempotent
        assert!(!notification.mark_read());
        assert!(notification.is_read());
    }

    #[test]
    fn test_vars_round_trip() {
        let map = json!({
            "name": "Ann",
            "total": 12.5,
            "items": [1, 2, 3],
            "nested": {"flag": true, "none": null}
        })
        .as_object()
        .cloned()
        .unwrap();

        let vars = Vars::from(map.clone());
        let text = vars.to_text();

        assert_eq!(Vars::from_text(&text), Vars::Map(map));
    }

    #[test]
    fn test_vars_non_object_passes_through() {
        assert_eq!(Vars::from_text("plain"), Vars::Raw("plain".to_string()));
        assert_eq!(Vars::from_text("[1,2]"), Vars::Raw("[1,2]".to_string()));
        assert_eq!(Vars::Raw("plain".to_string()).to_text(), "plain");
    }

    #[test]
    fn test_title_and_body() {
        let notification = stored("greeting", r#"{"name":"Ann"}"#, NotificationState::Unread);
        let templates = registry();

        assert_eq!(notification.title(&templates), "Hello Ann");
        assert_eq!(notification.body(&templates), "Welcome, Ann!");
    }

    #[test]
    fn test_missing_template_renders_empty() {
        let notification = stored("unknown", r#"{"name":"Ann"}"#, NotificationState::Unread);
        let templates = registry();

        assert_eq!(notification.title(&templates), "");
        assert_eq!(notification.body(&templates), "");
        assert!(notification.try_title(&templates).is_err());
    }

    #[test]
    fn test_raw_vars_render_template_unchanged() {
        let notification = stored("greeting", "not json", NotificationState::Unread);
        assert_eq!(notification.title(&registry()), "Hello {name}");
    }

    #[test]
    fn test_render_view() {
        let mut notification = stored("greeting", r#"{"name":"Ann"}"#, NotificationState::Unread);
        notification.mark_read();

        let view = notification.render(&registry());
        assert_eq!(view.title, "Hello Ann");
        assert!(view.read);
        assert!(!view.unread);
        assert_eq!(view.state, NotificationState::Read);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "read");
        assert_eq!(json["vars"]["name"], "Ann");
        assert!(json.get("tracking_id").is_none());
    }

    #[test]
    fn test_new_notification_ignores_protected_fields() {
        let draft: NewNotification = serde_json::from_value(json!({
            "user_id": "user-1",
            "template": "greeting",
            "vars": {"name": "Ann"},
            "state": 0,
            "id": 99
        }))
        .unwrap();

        let notification = Notification::from_new(7, draft, Utc::now());
        assert_eq!(notification.id(), 7);
        assert!(notification.is_unread());
        assert_eq!(notification.vars_text(), r#"{"name":"Ann"}"#);
    }

    #[test]
    fn test_new_notification_validation() {
        assert_eq!(
            NewNotification::new("", "greeting").validate(),
            Err(EntityError::MissingUserId)
        );
        assert_eq!(
            NewNotification::new("user-1", " ").validate(),
            Err(EntityError::MissingTemplate)
        );
        assert!(NewNotification::new("user-1", "greeting").validate().is_ok());
    }
}
