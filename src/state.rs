use std::sync::Arc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::config::Config;
use crate::libretranslate::LibreTranslateClient;
use crate::session::{PendingDispatch, SessionState};
use crate::translate::client::TranslateClient;
use crate::translate::interface::TranslationBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn TranslationBackend>,
    pub translator: Arc<TranslateClient>,
    pub sessions: Arc<DashMap<String, SessionState>>,
    pub debounce_tasks: Arc<DashMap<String, PendingDispatch>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn TranslationBackend> =
            Arc::new(LibreTranslateClient::new(&config.backend_config)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Assemble state around an arbitrary backend implementation
    pub fn with_backend(config: Config, backend: Arc<dyn TranslationBackend>) -> Self {
        let translator = Arc::new(TranslateClient::new(
            backend.clone(),
            config.translate_config.cache_capacity,
        ));

        Self {
            config,
            backend,
            translator,
            sessions: Arc::new(DashMap::new()),
            debounce_tasks: Arc::new(DashMap::new()),
        }
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
