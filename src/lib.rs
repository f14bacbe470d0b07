//! Polyrelay - Multi-provider LLM relay
//!
//! Forwards one chat message to several LLM providers at once (or one
//! image prompt to several image providers) and returns every answer
//! together. Credentials come in pairs per provider family; a persisted
//! 0/1 index picks which one of each pair a request uses.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod provider;
pub mod rotation;
pub mod server;

use client::HttpClient;
use config::{ConfigLoader, ImageFamily, ProvidersConfig};
use dispatch::{DispatchResult, Dispatcher};
use error::{RelayError, Result};
use provider::{build_chat_adapters, build_image_adapters, ImageRef};
use rotation::{Credentials, FileRotationStore, KeyRotator};

/// One provider's answer in a chat response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub model: String,
    pub text: String,
}

impl Reply {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
        }
    }
}

/// Images gathered from every image provider.
///
/// Failed URL providers are left out of their list; a failed inline
/// provider leaves `gemini_base64` as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageSet {
    /// `data:image/png;base64,...`
    pub gemini_base64: Option<String>,
    pub dalle_urls: Vec<String>,
    pub imagen_urls: Vec<String>,
    pub flux_urls: Vec<String>,
}

impl ImageSet {
    fn from_outcomes(result: DispatchResult<ImageRef>, families: &[ImageFamily]) -> Self {
        let mut set = ImageSet::default();

        for (outcome, family) in result.into_iter().zip(families) {
            let image = match outcome.result {
                Ok(image) => image,
                Err(e) => {
                    warn!(provider = %outcome.provider, error = %e, "image generation failed");
                    continue;
                }
            };

            match family {
                ImageFamily::Gemini => {
                    set.gemini_base64.get_or_insert(image.into_uri());
                }
                ImageFamily::Dalle => set.dalle_urls.push(image.into_uri()),
                ImageFamily::Imagen => set.imagen_urls.push(image.into_uri()),
                ImageFamily::Flux => set.flux_urls.push(image.into_uri()),
            }
        }

        set
    }
}

/// The relay core: configuration, credentials, rotation and dispatch
pub struct Relay {
    /// Provider configurations
    config: ProvidersConfig,

    /// Credential pairs per family
    credentials: Credentials,

    /// Shared 0/1 rotation index
    rotator: KeyRotator,

    dispatcher: Dispatcher,

    /// HTTP client
    http: HttpClient,
}

impl Relay {
    /// Create a relay from already-loaded parts
    pub fn new(config: ProvidersConfig, credentials: Credentials, rotator: KeyRotator) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            credentials,
            rotator,
            dispatcher: Dispatcher::default(),
            http: HttpClient::new()?,
        })
    }

    /// Load providers from the default locations (or `config_path`),
    /// credentials from the environment and rotation state from `state_file`
    pub fn from_environment(
        config_path: Option<&Path>,
        state_file: &Path,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let loader = match config_path {
            Some(path) => ConfigLoader::from_path(path)?,
            None => ConfigLoader::new()?,
        };
        let config = loader.into_config();

        let families = config.families();
        let credentials = Credentials::from_env(families.iter().map(String::as_str));
        for family in &families {
            let slots = credentials
                .pair(family)
                .map(|p| p.configured_slots())
                .unwrap_or(0);
            if slots < 2 {
                warn!(family = %family, slots, "credential pair incomplete");
            }
        }

        let rotator = KeyRotator::new(Arc::new(FileRotationStore::new(state_file)));
        Ok(Self::new(config, credentials, rotator)?.with_dispatcher(Dispatcher::new(timeout)))
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &ProvidersConfig {
        &self.config
    }

    pub fn rotator(&self) -> &KeyRotator {
        &self.rotator
    }

    /// Send `message` to every chat provider.
    ///
    /// Advances the rotation once and uses the slot that was current before
    /// the advance. Every provider gets an entry; failures read
    /// `"Error: ..."`. No validation of `message`: an empty one is sent as is.
    pub async fn chat(&self, message: &str) -> Result<Vec<Reply>> {
        if self.config.chat_providers().next().is_none() {
            return Err(RelayError::Config("No chat providers configured".to_string()));
        }

        let index = self.rotator.advance();
        let adapters = build_chat_adapters(&self.config, &self.credentials, index, &self.http);

        info!(index, providers = adapters.len(), "dispatching chat message");
        let result = self.dispatcher.dispatch_chat(message, &adapters).await;

        let replies = result
            .into_iter()
            .map(|outcome| match outcome.result {
                Ok(text) => Reply::new(outcome.provider, text),
                Err(e) => {
                    warn!(provider = %outcome.provider, error = %e, "chat provider failed");
                    Reply::new(outcome.provider, format!("Error: {}", e))
                }
            })
            .collect();

        Ok(replies)
    }

    /// Send `prompt` to every image provider.
    ///
    /// Uses the current slot and advances only when the inline image
    /// provider succeeded.
    pub async fn generate_images(&self, prompt: &str) -> Result<ImageSet> {
        if prompt.trim().is_empty() {
            return Err(RelayError::Validation("Missing prompt".to_string()));
        }

        let index = self.rotator.current_index();
        let adapters = build_image_adapters(&self.config, &self.credentials, index, &self.http);
        if adapters.is_empty() {
            return Err(RelayError::Config("No image providers configured".to_string()));
        }

        info!(index, providers = adapters.len(), "dispatching image prompt");
        let families: Vec<ImageFamily> = adapters.iter().map(|a| a.family()).collect();
        let result = self.dispatcher.dispatch_images(prompt, &adapters).await;

        let set = ImageSet::from_outcomes(result, &families);
        if set.gemini_base64.is_some() {
            self.rotator.advance();
        }

        Ok(set)
    }
}
