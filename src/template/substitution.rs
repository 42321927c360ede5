//! Named-placeholder substitution for template strings

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::config::PlaceholderConfig;

/// Delimiters surrounding a variable name inside a template string.
///
/// The default is `{name}`. An empty suffix gives the `:name` style, where
/// longer variable names are tried first so `:name` never eats `:name_full`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    prefix: String,
    suffix: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new("{", "}")
    }
}

impl Placeholder {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &PlaceholderConfig) -> Self {
        Self::new(config.prefix.clone(), config.suffix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Replace every placeholder naming a key of `vars` with its value.
    ///
    /// The template is scanned once, so substituted values are never
    /// themselves expanded. Placeholders without a matching variable are
    /// left untouched.
    pub fn insert(&self, template: &str, vars: &Map<String, Value>) -> String {
        let mut keys: Vec<&str> = vars
            .keys()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            return template.to_string();
        }

        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        'scan: while !rest.is_empty() {
            if let Some(after_prefix) = rest.strip_prefix(self.prefix.as_str()) {
                for key in &keys {
                    let matched = after_prefix
                        .strip_prefix(key)
                        .and_then(|after_key| after_key.strip_prefix(self.suffix.as_str()));

                    if let Some(remaining) = matched {
                        out.push_str(&format_value(&vars[*key]));
                        rest = remaining;
                        continue 'scan;
                    }
                }
            }

            match rest.chars().next() {
                Some(ch) => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
                None => break,
            }
        }

        out
    }
}

fn format_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Null => Cow::Borrowed(""),
        // For arrays and objects, use JSON representation
        _ => Cow::Owned(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test vars must be an object"),
        }
    }

    #[test]
    fn test_insert_simple() {
        let placeholder = Placeholder::default();
        let result = placeholder.insert("Hello {name}", &vars(json!({"name": "Ann"})));
        assert_eq!(result, "Hello Ann");
    }

    #[test]
    fn test_insert_multiple_and_repeated() {
        let placeholder = Placeholder::default();
        let result = placeholder.insert(
            "Order {order} for {customer}, order {order} total {total}",
            &vars(json!({"order": "ORD-1", "customer": "Bob", "total": 12.5})),
        );
        assert_eq!(result, "Order ORD-1 for Bob, order ORD-1 total 12.5");
    }

    #[test]
    fn test_insert_value_formatting() {
        let placeholder = Placeholder::default();
        let result = placeholder.insert(
            "{flag}|{missing}|{none}|{list}",
            &vars(json!({"flag": true, "none": null, "list": [1, 2]})),
        );
        assert_eq!(result, "true|{missing}||[1,2]");
    }

    #[test]
    fn test_insert_empty_vars_returns_template() {
        let placeholder = Placeholder::default();
        assert_eq!(placeholder.insert("Hi {name}", &Map::new()), "Hi {name}");
    }

    #[test]
    fn test_insert_does_not_expand_substituted_values() {
        let placeholder = Placeholder::default();
        let result = placeholder.insert(
            "{a} and {b}",
            &vars(json!({"a": "{b}", "b": "second"})),
        );
        assert_eq!(result, "{b} and second");
    }

    #[test]
    fn test_colon_style_prefers_longest_name() {
        let placeholder = Placeholder::new(":", "");
        let result = placeholder.insert(
            "Dear :name_full (:name)",
            &vars(json!({"name": "Ann", "name_full": "Ann Smith"})),
        );
        assert_eq!(result, "Dear Ann Smith (Ann)");
    }

    #[test]
    fn test_insert_multibyte_text() {
        let placeholder = Placeholder::default();
        let result = placeholder.insert("Größe: {size} ✓", &vars(json!({"size": 42})));
        assert_eq!(result, "Größe: 42 ✓");
    }
}
