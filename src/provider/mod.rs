//! Provider Module
//!
//! Uniform adapter contract over heterogeneous chat and image APIs, plus
//! the factory that builds adapters from configuration and resolved
//! credentials.
//!
//! Building an adapter never touches the network; only `respond` and
//! `generate` do.

pub mod cohere;
pub mod gemini;
pub mod openai;

use crate::client::HttpClient;
use crate::config::{ImageFamily, ProviderConfig, ProviderKind, ProvidersConfig};
use crate::error::ProviderError;
use crate::rotation::Credentials;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub use cohere::CohereChat;
pub use gemini::{GeminiChat, GeminiImage, ImagenImage};
pub use openai::{OpenAiChat, OpenAiImage};

/// Answers a single chat turn
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Name shown to users as the reply's model
    fn name(&self) -> &str;

    async fn respond(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Generates one image
#[async_trait]
pub trait ImageAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Which output slot this adapter feeds
    fn family(&self) -> ImageFamily;

    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError>;
}

/// A generated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Hosted by the provider
    Url(String),

    /// Raw base64 bytes, no data-URI prefix
    Base64(String),
}

impl ImageRef {
    /// URL as-is, base64 as a `data:image/png;base64,...` URI
    pub fn into_uri(self) -> String {
        match self {
            ImageRef::Url(url) => url,
            ImageRef::Base64(data) => format!("data:image/png;base64,{}", data),
        }
    }
}

/// Per-adapter settings resolved from a `ProviderConfig` and a credential
#[derive(Clone)]
pub struct AdapterSettings {
    pub name: String,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    pub headers: HashMap<String, String>,
    api_key: String,
}

impl AdapterSettings {
    pub fn from_config(config: &ProviderConfig, api_key: Option<&str>) -> Self {
        Self {
            name: config.name.clone(),
            model: config.model.clone(),
            base_url: config.get_base_url().trim_end_matches('/').to_string(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            headers: config.headers.clone(),
            api_key: api_key.unwrap_or_default().to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `{base_url}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for AdapterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSettings")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_key", &!self.api_key.is_empty())
            .finish()
    }
}

/// Build one chat adapter per enabled chat provider, using credential slot `index`
pub fn build_chat_adapters(
    config: &ProvidersConfig,
    credentials: &Credentials,
    index: usize,
    http: &HttpClient,
) -> Vec<Arc<dyn ChatAdapter>> {
    config
        .chat_providers()
        .filter_map(|provider| {
            let settings =
                AdapterSettings::from_config(provider, credentials.resolve(&provider.family, index));
            let http = http.clone();
            let adapter: Arc<dyn ChatAdapter> = match provider.kind {
                ProviderKind::OpenaiChat => Arc::new(OpenAiChat::new(settings, http)),
                ProviderKind::GeminiChat => Arc::new(GeminiChat::new(settings, http)),
                ProviderKind::CohereChat => Arc::new(CohereChat::new(settings, http)),
                _ => return None,
            };
            Some(adapter)
        })
        .collect()
}

/// Build image adapters, repeating a provider `count` times
pub fn build_image_adapters(
    config: &ProvidersConfig,
    credentials: &Credentials,
    index: usize,
    http: &HttpClient,
) -> Vec<Arc<dyn ImageAdapter>> {
    let mut adapters: Vec<Arc<dyn ImageAdapter>> = Vec::new();

    for provider in config.image_providers() {
        let Some(family) = provider.effective_image_family() else {
            continue;
        };
        let settings =
            AdapterSettings::from_config(provider, credentials.resolve(&provider.family, index));

        let adapter: Arc<dyn ImageAdapter> = match provider.kind {
            ProviderKind::GeminiImage => {
                Arc::new(GeminiImage::new(settings, family, http.clone()))
            }
            ProviderKind::OpenaiImage => {
                Arc::new(OpenAiImage::new(settings, family, http.clone()))
            }
            ProviderKind::ImagenImage => {
                Arc::new(ImagenImage::new(settings, family, http.clone()))
            }
            _ => continue,
        };

        for _ in 0..provider.count {
            adapters.push(adapter.clone());
        }
    }

    adapters
}
