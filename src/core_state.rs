//! Application state shared by every request.
//!
//! `CoreState` is built once at startup from `Settings`: the configured
//! store backend, the PDF loader and both LLM clients are constructed here
//! and handed to handlers behind trait objects.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, Settings, StoreBackend};
use crate::db::{
    CallLogStore, DatabaseError, DocumentStore, EventStore, MemoryStore, PostgrestStore,
    SqliteStore,
};
use crate::pipeline::extraction::{DocumentLoader, PdfDocumentLoader};
use crate::pipeline::llm::{ChatCompletionClient, LlmClient, LlmError};
use crate::pipeline::postcall::PostCallProcessor;
use crate::pipeline::structuring::CarePlanEventExtractor;
use crate::uploads::{resolve_upload_path, UploadError};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type StoreHandles = (
    Arc<dyn EventStore>,
    Arc<dyn CallLogStore>,
    Arc<dyn DocumentStore>,
);

/// One backend serves all three store capabilities.
fn split_store<S>(store: Arc<S>) -> StoreHandles
where
    S: EventStore + CallLogStore + DocumentStore + 'static,
{
    (store.clone(), store.clone(), store)
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub settings: Settings,
    pub events: Arc<dyn EventStore>,
    pub call_logs: Arc<dyn CallLogStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub loader: Arc<dyn DocumentLoader>,
    /// Model used for care-plan event extraction.
    pub extraction_llm: Arc<dyn LlmClient>,
    /// Model used for call summaries and patient Q&A.
    pub summary_llm: Arc<dyn LlmClient>,
}

impl CoreState {
    /// Construct stores and clients from settings.
    ///
    /// The PostgREST store and the LLM clients wrap blocking HTTP clients, so
    /// this must run outside the async runtime.
    pub fn build(settings: Settings) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&settings.upload_dir)?;

        let (events, call_logs, documents) = match settings.store_backend {
            StoreBackend::Sqlite => split_store(Arc::new(SqliteStore::open(&settings.database_path)?)),
            StoreBackend::Postgrest => {
                let supabase = settings
                    .supabase
                    .as_ref()
                    .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
                split_store(Arc::new(PostgrestStore::new(
                    &supabase.url,
                    &supabase.service_key,
                    supabase.timeout_secs,
                )?))
            }
            StoreBackend::Memory => split_store(Arc::new(MemoryStore::new())),
        };

        let llm = &settings.llm;
        let extraction_llm = Arc::new(ChatCompletionClient::new(
            &llm.base_url,
            llm.api_key.clone(),
            &llm.extraction_model,
            llm.temperature,
            llm.timeout_secs,
        )?);
        let summary_llm = Arc::new(ChatCompletionClient::new(
            &llm.base_url,
            llm.api_key.clone(),
            &llm.summary_model,
            llm.temperature,
            llm.timeout_secs,
        )?);

        if llm.api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; LLM-backed endpoints will fail");
        }
        if settings.webhook_secret.is_none() {
            tracing::warn!("ELEVENLABS_WEBHOOK_SECRET is not set; /postcall will reject deliveries");
        }
        tracing::info!(
            store = settings.store_backend.as_str(),
            upload_dir = %settings.upload_dir.display(),
            extraction_model = %llm.extraction_model,
            summary_model = %llm.summary_model,
            "Core state ready"
        );

        Ok(Self {
            events,
            call_logs,
            documents,
            loader: Arc::new(PdfDocumentLoader),
            extraction_llm,
            summary_llm,
            settings,
        })
    }

    pub fn store_label(&self) -> &'static str {
        self.settings.store_backend.as_str()
    }

    pub fn upload_path(&self, filename: &str) -> Result<PathBuf, UploadError> {
        resolve_upload_path(&self.settings.upload_dir, filename)
    }

    pub fn event_extractor(&self) -> CarePlanEventExtractor {
        CarePlanEventExtractor::new(self.extraction_llm.clone(), self.settings.plan_start_date)
    }

    pub fn postcall_processor(&self) -> PostCallProcessor {
        PostCallProcessor::new(
            self.summary_llm.clone(),
            self.events.clone(),
            self.call_logs.clone(),
        )
    }

    /// Record one handled request.
    pub fn log_access(&self, action: &str, status: u16) {
        tracing::info!(target: "careflow::audit", action, status, "API access");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::LlmSettings;
    use crate::pipeline::llm::MockLlmClient;

    pub(crate) fn test_settings(dir: &std::path::Path) -> Settings {
        Settings {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            data_dir: dir.to_path_buf(),
            upload_dir: dir.join("uploaded_pdfs"),
            database_path: dir.join("careflow.db"),
            store_backend: StoreBackend::Memory,
            supabase: None,
            llm: LlmSettings {
                base_url: "http://127.0.0.1:9".into(),
                api_key: None,
                extraction_model: "extract-model".into(),
                summary_model: "summary-model".into(),
                temperature: 0.2,
                timeout_secs: 5,
            },
            plan_start_date: chrono::NaiveDate::from_ymd_opt(2025, 4, 26).unwrap(),
            max_upload_bytes: 1024 * 1024,
            webhook_secret: Some("whsec_test".into()),
        }
    }

    /// In-memory state with scripted models. Does not touch the network.
    pub(crate) fn test_core_state(
        settings: Settings,
        store: Arc<MemoryStore>,
        extraction_llm: Arc<MockLlmClient>,
        summary_llm: Arc<MockLlmClient>,
    ) -> CoreState {
        CoreState {
            settings,
            events: store.clone(),
            call_logs: store.clone(),
            documents: store,
            loader: Arc::new(PdfDocumentLoader),
            extraction_llm,
            summary_llm,
        }
    }
}
