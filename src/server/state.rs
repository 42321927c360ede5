use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::auth::JwtValidator;
use crate::config::Settings;
use crate::dispatch::{NotificationManager, UserDirectory};
use crate::notification::{MemoryNotificationStore, NotificationStore};
use crate::notifier::NotifierService;
use crate::postgres::PostgresPool;
use crate::template::TemplateRegistry;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt_validator: Arc<JwtValidator>,
    pub notifier: Arc<NotifierService>,
    pub postgres_pool: Option<PostgresPool>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, notifier: NotifierService) -> Self {
        let jwt_validator = Arc::new(JwtValidator::new(&settings.jwt));

        Self {
            settings: Arc::new(settings),
            jwt_validator,
            notifier: Arc::new(notifier),
            postgres_pool: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_postgres(mut self, pool: PostgresPool) -> Self {
        self.postgres_pool = Some(pool);
        self
    }

    /// State backed by the in-memory store, with templates from `settings`.
    pub fn in_memory(settings: Settings, directory: Arc<dyn UserDirectory>) -> Self {
        let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
        let templates = Arc::new(TemplateRegistry::from_config(&settings.notifier));
        let manager = NotificationManager::new(store.clone(), directory, templates.clone())
            .strict_templates(settings.notifier.strict_templates);
        let notifier = NotifierService::new(store, Arc::new(manager), templates);

        Self::new(settings, notifier)
    }
}

impl FromRef<AppState> for Arc<JwtValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_validator.clone()
    }
}
