//! Notification message templates.
//!
//! This module provides:
//! - A read-only registry of named title/body templates loaded from configuration
//! - Named-placeholder substitution (`{variable}` by default)
//!
//! # Example
//!
//! ```ignore
//! let registry = TemplateRegistry::default()
//!     .with_template("new_order", "New order {order}", "{customer} placed order {order}");
//!
//! let vars = json!({"order": "ORD-1", "customer": "Ann"});
//! let rendered = registry.render("new_order", vars.as_object().unwrap())?;
//! assert_eq!(rendered.title, "New order ORD-1");
//! ```

mod registry;
mod substitution;

use thiserror::Error;

pub use registry::{MessageTemplate, RenderedTemplate, TemplateRegistry};
pub use substitution::Placeholder;

/// Template-specific error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
