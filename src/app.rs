//! App Core for Slidesmith.
//!
//! Central struct holding the session store and the services built on top of it.
//! Shared by every HTTP handler behind an `Arc`.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::managers::session_store::SessionStore;
use crate::services::exporter::Exporter;
use crate::services::llm_client::{ChatCompletionClient, LlmClient, OfflineClient};
use crate::services::slide_service::SlideService;
use crate::types::errors::LlmError;
use crate::types::settings::ServerSettings;

/// Central application struct holding all managers and services.
pub struct App {
    pub settings: ServerSettings,
    pub store: Arc<SessionStore>,
    pub slides: SlideService,
    pub exporter: Exporter,
}

impl App {
    /// Creates an App around an already-built completion client.
    pub fn new(settings: ServerSettings, llm: Arc<dyn LlmClient>) -> Self {
        let store = Arc::new(SessionStore::new(settings.deck.clone()));
        let slides = SlideService::new(Arc::clone(&store), llm);
        Self {
            settings,
            store,
            slides,
            exporter: Exporter::new(),
        }
    }

    /// Creates an App with a `ChatCompletionClient` when an API key is available,
    /// otherwise with `OfflineClient` (generation serves demo slides).
    pub fn from_settings(
        settings: ServerSettings,
        api_key: Option<Zeroizing<String>>,
    ) -> Result<Self, LlmError> {
        let llm: Arc<dyn LlmClient> = match api_key {
            Some(key) => {
                let client = ChatCompletionClient::new(&settings.llm, key)?;
                info!(endpoint = %client.endpoint(), model = %client.model(), "AI client configured");
                Arc::new(client)
            }
            None => {
                warn!("No AI API key configured; topic generation will serve demo slides");
                Arc::new(OfflineClient)
            }
        };
        Ok(Self::new(settings, llm))
    }
}
