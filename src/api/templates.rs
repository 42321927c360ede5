//! Template listing endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;
use crate::template::MessageTemplate;

#[derive(Debug, Serialize)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(flatten)]
    pub template: MessageTemplate,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateEntry>,
    pub total: usize,
    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
}

/// GET /api/v1/templates - List configured templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let registry = state.notifier.templates();

    let templates: Vec<TemplateEntry> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            registry.get(name).ok().map(|template| TemplateEntry {
                name: name.to_string(),
                template: template.clone(),
            })
        })
        .collect();
    let total = templates.len();

    Json(TemplateListResponse {
        templates,
        total,
        placeholder_prefix: registry.placeholder().prefix().to_string(),
        placeholder_suffix: registry.placeholder().suffix().to_string(),
    })
}
