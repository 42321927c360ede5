use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Key required in `X-API-Key` for administrative endpoints.
    /// When unset the administrative endpoints are open (development mode).
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
    /// Apply the embedded migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// "postgres" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Publish dispatched notifications to Redis for external delivery workers
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_channel")]
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Table holding `id` / `role_id` columns used to resolve role recipients
    #[serde(default = "default_users_table")]
    pub users_table: String,
    /// Reject dispatches naming a template that is not configured
    #[serde(default)]
    pub strict_templates: bool,
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
    /// `[[notifier.templates]]` entries; names are values so their case survives
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholderConfig {
    #[serde(default = "default_placeholder_prefix")]
    pub prefix: String,
    #[serde(default = "default_placeholder_suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Export spans over OTLP
    #[serde(default)]
    pub otel_enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Trace sampling ratio (0.0-1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_database_url() -> String {
    "postgres://localhost:5432/notifier".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_idle_timeout() -> u32 {
    300 // 5 minutes
}

fn default_true() -> bool {
    true
}

fn default_store_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_channel() -> String {
    "notifier:notifications".to_string()
}

fn default_users_table() -> String {
    "users".to_string()
}

fn default_placeholder_prefix() -> String {
    "{".to_string()
}

fn default_placeholder_suffix() -> String {
    "}".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "notifier-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("store.backend", "memory")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // NOTIFIER_SERVER__PORT, NOTIFIER_JWT__SECRET, NOTIFIER_DATABASE__URL, ...
            .add_source(
                Environment::with_prefix("NOTIFIER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            channel: default_redis_channel(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            users_table: default_users_table(),
            strict_templates: false,
            placeholder: PlaceholderConfig::default(),
            templates: Vec::new(),
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            prefix: default_placeholder_prefix(),
            suffix: default_placeholder_suffix(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            otel_enabled: false,
            otel_endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8081);
        assert_eq!(server.max_body_bytes, 65536);

        let notifier = NotifierConfig::default();
        assert_eq!(notifier.users_table, "users");
        assert!(!notifier.strict_templates);
        assert_eq!(notifier.placeholder.prefix, "{");
        assert_eq!(notifier.placeholder.suffix, "}");

        assert_eq!(StoreConfig::default().backend, "memory");
        assert!(!RedisConfig::default().enabled);
    }

    #[test]
    fn test_deserialize_templates_section() {
        let toml = r#"
            [jwt]
            secret = "secret"

            [[notifier.templates]]
            name = "newOrder"
            title = "New order {order}"
            body = "{customer} ordered"

            [[notifier.templates]]
            name = "password_changed"
            title = "Password changed"
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let templates = &settings.notifier.templates;
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "newOrder");
        assert_eq!(templates[0].title, "New order {order}");
        assert_eq!(templates[0].body, "{customer} ordered");
        assert_eq!(templates[1].name, "password_changed");
        assert_eq!(templates[1].body, "");
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
        assert_eq!(settings.server_addr(), "0.0.0.0:8081");
    }
}
