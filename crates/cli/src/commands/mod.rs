//! Command implementations and the shared service wiring they run on.

pub mod config_cmd;
pub mod document;
pub mod generate;
pub mod init;
pub mod policy;
pub mod template;

use policydraft_config::AppConfig;
use policydraft_core::{GeneratedDocument, Policy, Provider, Store, Template, VectorIndex};
use policydraft_engine::{
    ContextAssembler, Degradation, DocumentService, Generator, PlainTextExtractor, PolicyService,
    TemplateService,
};
use policydraft_providers::OpenAiCompatProvider;
use policydraft_store::{FileStore, InMemoryStore, LocalVectorIndex};
use std::sync::Arc;
use tracing::{debug, warn};

/// The services a command needs, built from the active configuration.
pub struct App {
    pub templates: TemplateService,
    pub documents: DocumentService,
    pub policies: PolicyService,
}

impl App {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        if !config.has_api_key() {
            warn!("No API key set; AI calls will fall back (set OPENAI_API_KEY)");
        }

        let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::from_config(config));
        let data_dir = &config.storage.data_dir;

        let (templates, documents, policies, index): (
            Arc<dyn Store<Template>>,
            Arc<dyn Store<GeneratedDocument>>,
            Arc<dyn Store<Policy>>,
            Arc<dyn VectorIndex>,
        ) = match config.storage.backend.as_str() {
            "memory" => (
                Arc::new(InMemoryStore::<Template>::new()),
                Arc::new(InMemoryStore::<GeneratedDocument>::new()),
                Arc::new(InMemoryStore::<Policy>::new()),
                Arc::new(LocalVectorIndex::new(config.vector.dimensions)),
            ),
            _ => (
                Arc::new(FileStore::<Template>::in_dir(data_dir)),
                Arc::new(FileStore::<GeneratedDocument>::in_dir(data_dir)),
                Arc::new(FileStore::<Policy>::in_dir(data_dir)),
                Arc::new(LocalVectorIndex::in_dir(
                    data_dir,
                    &config.vector.collection,
                    config.vector.dimensions,
                )),
            ),
        };
        debug!(backend = %config.storage.backend, data_dir = %data_dir.display(), "Stores ready");

        let assembler = Arc::new(ContextAssembler::from_config(provider.clone(), index, config));
        let generator = Arc::new(Generator::from_config(provider, config));

        Self {
            templates: TemplateService::new(templates.clone()),
            documents: DocumentService::new(templates, documents, assembler.clone(), generator),
            policies: PolicyService::from_config(
                policies,
                Arc::new(PlainTextExtractor::from_config(&config.rag)),
                assembler,
                config,
            ),
        }
    }
}

/// Print one warning line per degraded stage.
pub fn print_degradations(degradations: &[Degradation]) {
    for d in degradations {
        println!("   ⚠️  {} fell back: {}", d.stage, d.reason);
    }
}
