//! The AI service facade.
//!
//! [`BrandAssistant`] is constructed once and passed to every call site. Each
//! operation runs the same pipeline: cache lookup, input moderation, the
//! model call under the retry executor, JSON parsing and validation, output
//! moderation, then a cache write. Everything after the cache lookup races
//! the caller's [`CancelSignal`]; a cancelled operation caches nothing.

use crate::ai::{CompletionRequest, GroqHttpClient, LlmService};
use crate::cache::{cache_key, ResponseCache};
use crate::cancel::CancelSignal;
use crate::models::{
    BrandProfile, BrandSource, Config, DesignAuditResult, DesignPrompt, Language, TrendInsight,
};
use crate::moderation::{ContentModerator, LlmClassifierCheck, ProfanityServiceCheck};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::{prompts, screenshot, validate, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Model transport and moderator an assistant sends requests through.
#[derive(Clone)]
pub struct AssistantServices {
    pub llm: Arc<dyn LlmService>,
    pub moderator: Arc<ContentModerator>,
}

/// What one operation is about: used for the cache key and input moderation.
struct Job<'a> {
    operation: &'static str,
    language: Language,
    subject: Vec<u8>,
    moderated_input: &'a str,
}

pub struct BrandAssistant {
    config: Config,
    http: reqwest::Client,
    services: RwLock<Option<AssistantServices>>,
    retry: RetryExecutor,
    cache: ResponseCache,
}

impl BrandAssistant {
    /// Build from configuration. Without `groq_api_key` the assistant stays
    /// unconfigured until [`configure`](Self::configure) is called.
    pub fn new(config: Config) -> Self {
        let retry = RetryExecutor::new(RetryPolicy::new(
            config.retry_max_attempts,
            config.retry_base_delay,
        ));
        let cache = ResponseCache::new(config.cache_ttl);
        let api_key = config.groq_api_key.clone();

        let assistant = Self {
            config,
            http: reqwest::Client::new(),
            services: RwLock::new(None),
            retry,
            cache,
        };

        if let Some(key) = api_key {
            if let Err(e) = assistant.configure(&key) {
                warn!("Ignoring configured API key: {}", e);
            }
        }
        assistant
    }

    /// Build around injected services, bypassing Groq setup.
    ///
    /// Primarily useful for tests and harnesses that need mocks.
    pub fn with_services(
        services: AssistantServices,
        retry: RetryPolicy,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            config: Config::default(),
            http: reqwest::Client::new(),
            services: RwLock::new(Some(services)),
            retry: RetryExecutor::new(retry),
            cache: ResponseCache::new(cache_ttl),
        }
    }

    /// Install the Groq transport and moderation chain for `api_key`.
    pub fn configure(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::Configuration("Groq API key is empty".to_string()));
        }

        let llm: Arc<dyn LlmService> = Arc::new(GroqHttpClient::from_config(
            api_key.to_string(),
            &self.config,
            self.http.clone(),
        ));
        let moderator = ContentModerator::new(
            Box::new(LlmClassifierCheck::new(llm.clone())),
            Some(Box::new(
                ProfanityServiceCheck::new(self.http.clone())
                    .with_url(self.config.profanity_url.clone()),
            )),
            self.config.moderation_timeout,
        );

        *self.services.write().unwrap_or_else(|e| e.into_inner()) = Some(AssistantServices {
            llm,
            moderator: Arc::new(moderator),
        });
        info!(
            "Groq client configured (text model: {}, vision model: {})",
            self.config.text_model, self.config.vision_model
        );
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.services
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn services(&self) -> Result<AssistantServices> {
        self.services
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| Error::Configuration("Groq API key is not configured".to_string()))
    }

    async fn run<T, B, P>(
        &self,
        job: Job<'_>,
        build: B,
        parse: P,
        cancel: &CancelSignal,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        B: Future<Output = Result<CompletionRequest>>,
        P: Fn(&Value) -> Result<T>,
    {
        let services = self.services()?;
        let key = cache_key(job.operation, job.language.code(), &job.subject);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<T>(cached) {
                Ok(value) => {
                    debug!("[{}] cache hit", job.operation);
                    return Ok(value);
                }
                Err(e) => warn!("[{}] discarding unreadable cache entry: {}", job.operation, e),
            }
        }

        let operation = job.operation;
        let value = cancel
            .guard(services.moderator.moderated(job.moderated_input, async {
                let request = build.await?;
                let raw = self
                    .retry
                    .execute(operation, || services.llm.complete(&request))
                    .await?;
                let parsed = parse(&validate::parse_json(&raw)?)?;
                Ok((parsed, raw))
            }))
            .await?;

        self.cache.put(key, serde_json::to_value(&value)?);
        info!("[{}] completed", operation);
        Ok(value)
    }

    /// Extract a brand profile from pasted text, a website URL or a screenshot.
    pub async fn extract_brand(
        &self,
        source: &BrandSource,
        language: Language,
        cancel: &CancelSignal,
    ) -> Result<BrandProfile> {
        match source {
            BrandSource::Text(text) => {
                let text = non_empty(text, "Brand description")?;
                let job = Job {
                    operation: "brand-text",
                    language,
                    subject: text.as_bytes().to_vec(),
                    moderated_input: text,
                };
                let build = async { Ok(prompts::brand_from_text(text, language)) };
                self.run(job, build, validate::brand_profile, cancel).await
            }
            BrandSource::Url(url) => {
                let url = normalize_url(url)?;
                let job = Job {
                    operation: "brand-url",
                    language,
                    subject: url.as_bytes().to_vec(),
                    moderated_input: &url,
                };
                let build = async { Ok(prompts::brand_from_url(&url, language)) };
                self.run(job, build, validate::brand_profile, cancel).await
            }
            BrandSource::Screenshot(image) => {
                let job = Job {
                    operation: "brand-screenshot",
                    language,
                    subject: image.clone(),
                    moderated_input: "",
                };
                let build = async {
                    let prepared = screenshot::prepare(image).await?;
                    Ok(prompts::brand_from_screenshot(&prepared, language))
                };
                let mut profile: BrandProfile = self
                    .run(job, build, validate::brand_profile, cancel)
                    .await?;
                profile.reference_screenshot = Some(image.clone());
                Ok(profile)
            }
        }
    }

    /// Design prompts for `topic` that respect the brand.
    pub async fn generate_prompts(
        &self,
        brand: &BrandProfile,
        topic: &str,
        language: Language,
        cancel: &CancelSignal,
    ) -> Result<Vec<DesignPrompt>> {
        let topic = non_empty(topic, "Topic")?;
        let summary = prompts::brand_summary(brand);
        let job = Job {
            operation: "prompts",
            language,
            subject: format!("{}\n{}", topic, summary).into_bytes(),
            moderated_input: topic,
        };
        let build = async { Ok(prompts::design_prompts(brand, topic, language)) };
        self.run(job, build, validate::prompt_list, cancel).await
    }

    /// Current visual design trends relevant to `topic`.
    pub async fn discover_trends(
        &self,
        topic: &str,
        language: Language,
        cancel: &CancelSignal,
    ) -> Result<Vec<TrendInsight>> {
        let topic = non_empty(topic, "Topic")?;
        let job = Job {
            operation: "trends",
            language,
            subject: topic.as_bytes().to_vec(),
            moderated_input: topic,
        };
        let build = async { Ok(prompts::trends(topic, language)) };
        self.run(job, build, validate::trend_list, cancel).await
    }

    /// Score a design against the brand. The brand's reference screenshot,
    /// when present, is sent along for this call only.
    pub async fn audit_design(
        &self,
        design: &[u8],
        brand: &BrandProfile,
        language: Language,
        cancel: &CancelSignal,
    ) -> Result<DesignAuditResult> {
        let mut subject = design.to_vec();
        subject.extend_from_slice(prompts::brand_summary(brand).as_bytes());
        if let Some(reference) = &brand.reference_screenshot {
            subject.extend_from_slice(reference);
        }

        let job = Job {
            operation: "audit",
            language,
            subject,
            moderated_input: "",
        };
        let build = async {
            let prepared_design = screenshot::prepare(design).await?;
            let mut prepared_brand = brand.clone();
            if let Some(reference) = &brand.reference_screenshot {
                prepared_brand.reference_screenshot = Some(screenshot::prepare(reference).await?);
            }
            Ok(prompts::design_audit(
                &prepared_design,
                &prepared_brand,
                language,
            ))
        };
        self.run(job, build, validate::audit_result, cancel).await
    }
}

fn non_empty<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(Error::Validation(format!("{} is empty", what)))
    } else {
        Ok(trimmed)
    }
}

/// Bare domains get an `https://` scheme.
fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = non_empty(raw, "URL")?;
    if trimmed.chars().any(char::is_whitespace) || !trimmed.contains('.') {
        return Err(Error::Validation(format!("'{}' is not a website URL", trimmed)));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}
