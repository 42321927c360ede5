mod settings;

pub use settings::{
    ApiConfig, DatabaseConfig, JwtConfig, LogFormat, NotifierConfig, PlaceholderConfig,
    RedisConfig, ServerConfig, Settings, StoreConfig, TelemetryConfig, TemplateConfig,
};
