//! Command orchestration for the CLI: credential resolution, input loading
//! and dispatch onto the [`BrandAssistant`].

use crate::assistant::BrandAssistant;
use crate::cancel::CancelSignal;
use crate::models::{BrandProfile, BrandSource, Config, Language};
use crate::sandbox::{render_brand_board, InMemoryDocument};
use crate::storage::{stored_api_key, JsonFileStore, KeyValueStore, API_KEY_STORAGE_KEY};
use crate::{validate, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One unit of CLI work.
#[derive(Debug, Clone)]
pub enum Command {
    Extract(ExtractInput),
    Trends {
        topic: String,
    },
    Prompts {
        topic: String,
        brand: PathBuf,
    },
    Audit {
        image: PathBuf,
        brand: PathBuf,
        reference: Option<PathBuf>,
    },
    SetKey {
        key: String,
    },
    Board {
        brand: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub enum ExtractInput {
    Text(String),
    Url(String),
    Image(PathBuf),
}

pub struct App {
    assistant: BrandAssistant,
    store: Box<dyn KeyValueStore>,
}

impl App {
    /// Build an app from an assistant and a settings store.
    ///
    /// Tests use this to inject an assistant wired to mocks.
    pub fn with_services(assistant: BrandAssistant, store: Box<dyn KeyValueStore>) -> Self {
        Self { assistant, store }
    }

    /// Construct from environment configuration. The API key comes from
    /// `GROQ_API_KEY` first, then from the settings store.
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let store = JsonFileStore::new(&config.store_path);
        let assistant = BrandAssistant::new(config);

        if !assistant.is_configured() {
            match stored_api_key(&store) {
                Ok(Some(key)) => {
                    info!("Using API key from {}", store.path().display());
                    assistant.configure(&key)?;
                }
                Ok(None) => warn!("No Groq API key configured; run `set-key` or set GROQ_API_KEY"),
                Err(e) => warn!("Could not read settings store: {}", e),
            }
        }

        Ok(Self::with_services(assistant, Box::new(store)))
    }

    pub fn assistant(&self) -> &BrandAssistant {
        &self.assistant
    }

    /// Run a command until it finishes or Ctrl-C cancels it.
    pub async fn run(&self, command: Command, language: Language) -> Result<String> {
        let (handle, cancel) = CancelSignal::pair();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; cancelling");
                handle.cancel();
            }
        });

        let output = self.execute(command, language, &cancel).await;
        interrupt.abort();
        output
    }

    /// Execute a command and render its result as pretty JSON.
    pub async fn execute(
        &self,
        command: Command,
        language: Language,
        cancel: &CancelSignal,
    ) -> Result<String> {
        match command {
            Command::Extract(input) => {
                let source = match input {
                    ExtractInput::Text(text) => BrandSource::Text(text),
                    ExtractInput::Url(url) => BrandSource::Url(url),
                    ExtractInput::Image(path) => BrandSource::Screenshot(read_file(&path)?),
                };
                let profile = self.assistant.extract_brand(&source, language, cancel).await?;
                Ok(serde_json::to_string_pretty(&profile)?)
            }
            Command::Trends { topic } => {
                let trends = self
                    .assistant
                    .discover_trends(&topic, language, cancel)
                    .await?;
                Ok(serde_json::to_string_pretty(&trends)?)
            }
            Command::Prompts { topic, brand } => {
                let brand = load_brand(&brand)?;
                let prompts = self
                    .assistant
                    .generate_prompts(&brand, &topic, language, cancel)
                    .await?;
                Ok(serde_json::to_string_pretty(&prompts)?)
            }
            Command::Audit {
                image,
                brand,
                reference,
            } => {
                let design = read_file(&image)?;
                let mut brand = load_brand(&brand)?;
                if let Some(reference) = reference {
                    brand.reference_screenshot = Some(read_file(&reference)?);
                }
                let audit = self
                    .assistant
                    .audit_design(&design, &brand, language, cancel)
                    .await?;
                Ok(serde_json::to_string_pretty(&audit)?)
            }
            Command::SetKey { key } => {
                self.assistant.configure(&key)?;
                self.store.set(API_KEY_STORAGE_KEY, key.trim())?;
                info!("Stored Groq API key");
                Ok(serde_json::to_string_pretty(&serde_json::json!({ "configured": true }))?)
            }
            Command::Board { brand } => {
                let brand = load_brand(&brand)?;
                let document = InMemoryDocument::new();
                render_brand_board(&document, &brand).await?;
                Ok(serde_json::to_string_pretty(&document.nodes())?)
            }
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        Error::Validation(format!("Could not read {}: {}", path.display(), e))
    })
}

/// Load a brand profile saved from `extract`, re-applying validation so
/// hand-edited files get the same normalization.
pub fn load_brand(path: &Path) -> Result<BrandProfile> {
    let raw = fs::read_to_string(path).map_err(|e| {
        Error::Validation(format!("Could not read {}: {}", path.display(), e))
    })?;
    validate::brand_profile(&validate::parse_json(&raw)?)
}
