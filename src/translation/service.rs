/*!
 * Translation service over chat providers.
 *
 * Backends are tried in order; the first non-empty translation wins.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{ChatRequest, OpenAiCompatible, Provider};
use crate::translation::prompts::{PromptStyle, TranslationRequest};
use crate::translation::Translator;

/// A provider and the prompt style it is spoken to with
#[derive(Debug, Clone)]
struct Backend {
    provider: Arc<dyn Provider>,
    style: PromptStyle,
}

/// Sentence translation with provider fallback
#[derive(Debug, Clone)]
pub struct TranslationService {
    backends: Vec<Backend>,
    temperature: f32,
    max_tokens: u32,
}

impl TranslationService {
    /// Create a service with no backends
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            backends: Vec::new(),
            temperature,
            max_tokens,
        }
    }

    /// Append a backend to the fallback chain
    pub fn with_backend(mut self, provider: Arc<dyn Provider>, style: PromptStyle) -> Self {
        self.backends.push(Backend { provider, style });
        self
    }

    /// Build the chain for the configured provider selection.
    ///
    /// With `auto`, providers without an API key are skipped; an explicitly
    /// selected provider without a key is an error.
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let mut service = Self::new(config.temperature, config.max_tokens);

        for provider_type in config.provider.chain() {
            let api_key = config.get_api_key(&provider_type);
            if api_key.is_empty() {
                if config.provider == TranslationProvider::Auto {
                    debug!("Skipping {}: no API key", provider_type.display_name());
                    continue;
                }
                return Err(ProviderError::AuthenticationError(format!(
                    "no API key for {}",
                    provider_type.display_name()
                ))
                .into());
            }

            let client = OpenAiCompatible::new(
                provider_type.to_lowercase_string(),
                api_key,
                config.get_endpoint(&provider_type),
                config.get_model(&provider_type),
                config.get_timeout_secs(&provider_type),
            );

            let (client, style) = match provider_type {
                TranslationProvider::OpenRouter => (client.with_header("X-Title", "dubline"), PromptStyle::Dubbing),
                _ => (client, PromptStyle::Tagged),
            };
            service = service.with_backend(Arc::new(client), style);
        }

        if service.backends.is_empty() {
            return Err(ProviderError::Unavailable(format!(
                "none of {} has an API key",
                config.provider.display_name()
            ))
            .into());
        }

        Ok(service)
    }

    /// Backend names in fallback order
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.provider.name()).collect()
    }

    async fn translate_with(
        &self,
        backend: &Backend,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let chat = ChatRequest::new(backend.provider.model(), self.max_tokens)
            .temperature(self.temperature)
            .add_message("user", backend.style.render(request));

        let response = backend.provider.complete(chat).await?;
        let translated = backend.style.extract(response.text());
        if translated.is_empty() {
            return Err(ProviderError::EmptyResponse(backend.provider.name().to_string()));
        }
        Ok(translated)
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        let mut last_error = ProviderError::Unavailable("no backend configured".to_string());

        for backend in &self.backends {
            match self.translate_with(backend, request).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    warn!("{} translation failed: {}", backend.provider.name(), e);
                    last_error = e;
                }
            }
        }

        Err(TranslationError::Provider(last_error))
    }
}
