//! Immutable registry of configured message templates

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::NotifierConfig;

use super::substitution::Placeholder;
use super::{TemplateError, TemplateResult};

/// A configured title/body pair with named placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub title: String,
    pub body: String,
}

/// Title and body with all known variables substituted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTemplate {
    pub title: String,
    pub body: String,
}

/// Template lookup table, built once from configuration and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, MessageTemplate>,
    placeholder: Placeholder,
}

impl TemplateRegistry {
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            templates: HashMap::new(),
            placeholder,
        }
    }

    /// Build the registry from the `notifier` configuration section
    pub fn from_config(config: &NotifierConfig) -> Self {
        let mut registry = Self::new(Placeholder::from_config(&config.placeholder));

        for template in &config.templates {
            if template.name.trim().is_empty() {
                tracing::warn!("Skipping template with empty name");
                continue;
            }
            let previous = registry.templates.insert(
                template.name.clone(),
                MessageTemplate {
                    title: template.title.clone(),
                    body: template.body.clone(),
                },
            );
            if previous.is_some() {
                tracing::warn!(name = %template.name, "Duplicate template, keeping the last one");
            }
        }

        tracing::info!(
            templates = registry.templates.len(),
            prefix = %registry.placeholder.prefix(),
            suffix = %registry.placeholder.suffix(),
            "Template registry loaded"
        );

        registry
    }

    /// Add a template, replacing any previous one with the same name
    pub fn with_template(
        mut self,
        name: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        self.templates.insert(
            name.into(),
            MessageTemplate {
                title: title.into(),
                body: body.into(),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> TemplateResult<&MessageTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageTemplate)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    pub fn render_title(&self, name: &str, vars: &Map<String, Value>) -> TemplateResult<String> {
        let template = self.get(name)?;
        Ok(self.placeholder.insert(&template.title, vars))
    }

    pub fn render_body(&self, name: &str, vars: &Map<String, Value>) -> TemplateResult<String> {
        let template = self.get(name)?;
        Ok(self.placeholder.insert(&template.body, vars))
    }

    pub fn render(&self, name: &str, vars: &Map<String, Value>) -> TemplateResult<RenderedTemplate> {
        let template = self.get(name)?;

        Ok(RenderedTemplate {
            title: self.placeholder.insert(&template.title, vars),
            body: self.placeholder.insert(&template.body, vars),
        })
    }
}
