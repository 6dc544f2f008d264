//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use tabula::agent::{Analyst, AnalystConfig};
use tabula::config::Settings;
use tabula::providers::Model;
use tabula::providers::openai::OpenAIClient;
use tabula::store::DataStore;
use tabula::tool::Dispatcher;
use tabula::tools::database_registry;

/// Everything handlers need, built once at start-up.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The data store behind uploads and tools.
    pub store: Arc<DataStore>,
    /// The conversation loop.
    pub analyst: Arc<Analyst>,
    /// Upper bound on one exchange.
    pub timeout: Duration,
}

impl AppState {
    /// Wire `model` to `store` through the database tool set.
    #[must_use]
    pub fn new(store: Arc<DataStore>, model: Arc<dyn Model>, config: AnalystConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(database_registry(), Arc::clone(&store)));
        let analyst = Analyst::new(model, dispatcher).with_config(config);
        Self {
            store,
            analyst: Arc::new(analyst),
            timeout: Duration::from_secs(tabula::config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Build the store, model client and loop from `settings`.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or the HTTP client cannot be
    /// built.
    pub fn from_settings(settings: &Settings) -> tabula::Result<Self> {
        let store = Arc::new(DataStore::open(&settings.database_path)?);
        let model = OpenAIClient::from_settings(settings)?.completion_model(&settings.model);
        Ok(Self::new(store, Arc::new(model), AnalystConfig::from_settings(settings))
            .with_timeout(Duration::from_secs(settings.request_timeout_secs)))
    }

    /// Override the per-exchange timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
