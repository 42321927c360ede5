//! Notification dispatch manager.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::metrics::{DispatchMetrics, NotificationMetrics};
use crate::notification::{NewNotification, Notification, NotificationStore};
use crate::template::TemplateRegistry;

use super::channel::DeliveryChannel;
use super::directory::UserDirectory;
use super::DispatchError;

/// Send request: recipients by user id and/or role, plus template and vars.
///
/// `users` and `roles` accept a single id or a list; ids may be strings or
/// integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyRequest {
    #[serde(default, deserialize_with = "one_or_many")]
    pub users: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
    pub template: String,
    #[serde(default)]
    pub vars: Map<String, Value>,
}

impl NotifyRequest {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.users.push(user_id.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Id {
    Text(String),
    Number(i64),
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        match id {
            Id::Text(s) => s,
            Id::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Id),
    Many(Vec<Id>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(id)) => vec![id.into()],
        Some(OneOrMany::Many(ids)) => ids.into_iter().map(String::from).collect(),
        None => Vec::new(),
    })
}

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    /// Correlation id shared by every notification of this dispatch
    pub tracking_id: String,
    /// Number of notifications created
    pub recipients: usize,
}

/// Sends notifications on behalf of the facade
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn notify(&self, request: NotifyRequest) -> Result<DispatchReceipt, DispatchError>;
}

/// Persists one notification per recipient and fans them out to the
/// configured delivery channels.
pub struct NotificationManager {
    store: Arc<dyn NotificationStore>,
    directory: Arc<dyn UserDirectory>,
    templates: Arc<TemplateRegistry>,
    channels: Vec<Arc<dyn DeliveryChannel>>,
    strict_templates: bool,
}

impl NotificationManager {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        directory: Arc<dyn UserDirectory>,
        templates: Arc<TemplateRegistry>,
    ) -> Self {
        Self {
            store,
            directory,
            templates,
            channels: Vec::new(),
            strict_templates: false,
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Reject templates missing from the registry
    pub fn strict_templates(mut self, strict: bool) -> Self {
        self.strict_templates = strict;
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Explicit users followed by role members, first occurrence wins
    pub async fn resolve_recipients(
        &self,
        users: &[String],
        roles: &[String],
    ) -> Result<Vec<String>, DispatchError> {
        let mut seen = HashSet::new();
        let mut recipients = Vec::new();

        let role_members = if roles.is_empty() {
            Vec::new()
        } else {
            self.directory.users_in_roles(roles).await?
        };

        for user in users.iter().chain(role_members.iter()) {
            let user = user.trim();
            if !user.is_empty() && seen.insert(user.to_string()) {
                recipients.push(user.to_string());
            }
        }

        Ok(recipients)
    }

    fn validate(&self, request: &NotifyRequest) -> Result<(), DispatchError> {
        if request.template.trim().is_empty() {
            return Err(DispatchError::MissingTemplate);
        }
        if self.strict_templates && !self.templates.contains(&request.template) {
            return Err(DispatchError::UnknownTemplate(request.template.clone()));
        }
        Ok(())
    }

    async fn fan_out(&self, notifications: &[Notification]) {
        if self.channels.is_empty() {
            return;
        }

        let views: Vec<_> = notifications
            .iter()
            .map(|n| n.render(&self.templates))
            .collect();

        let deliveries = views.iter().flat_map(|view| {
            self.channels.iter().map(move |channel| async move {
                let result = channel.deliver(view).await;
                (channel.name(), view.id, result)
            })
        });

        for (channel, notification_id, result) in join_all(deliveries).await {
            match result {
                Ok(()) => DispatchMetrics::record_delivery(channel, true),
                Err(e) => {
                    DispatchMetrics::record_delivery(channel, false);
                    tracing::warn!(
                        channel = %channel,
                        notification_id = notification_id,
                        error = %e,
                        "Channel delivery failed"
                    );
                }
            }
        }
    }

    async fn dispatch(&self, request: NotifyRequest) -> Result<DispatchReceipt, DispatchError> {
        self.validate(&request)?;

        let recipients = self
            .resolve_recipients(&request.users, &request.roles)
            .await?;
        if recipients.is_empty() {
            return Err(DispatchError::NoRecipients);
        }

        let tracking_id = generate_tracking_id();
        let drafts: Vec<NewNotification> = recipients
            .iter()
            .map(|user_id| {
                NewNotification::new(user_id.clone(), request.template.clone())
                    .vars(request.vars.clone())
                    .tracking_id(tracking_id.clone())
            })
            .collect();

        let created = self.store.insert_many(drafts).await?;
        NotificationMetrics::record_created(created.len());

        self.fan_out(&created).await;

        tracing::info!(
            tracking_id = %tracking_id,
            template = %request.template,
            recipients = created.len(),
            "Notifications dispatched"
        );

        Ok(DispatchReceipt {
            tracking_id,
            recipients: created.len(),
        })
    }
}

#[async_trait]
impl Dispatcher for NotificationManager {
    #[tracing::instrument(
        name = "dispatch.notify",
        skip(self, request),
        fields(template = %request.template)
    )]
    async fn notify(&self, request: NotifyRequest) -> Result<DispatchReceipt, DispatchError> {
        let result = self.dispatch(request).await;

        match &result {
            Ok(_) => DispatchMetrics::record_result("success"),
            Err(e) => DispatchMetrics::record_result(e.metric_label()),
        }

        result
    }
}

fn generate_tracking_id() -> String {
    Uuid::new_v4().simple().to_string()
}
