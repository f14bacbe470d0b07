//! OpenAI-compatible adapters
//!
//! Chat completions and image generations for any provider speaking the
//! OpenAI wire format (Mistral, Together, OpenRouter, OpenAI itself).

use crate::api::{CompletionRequest, CompletionResponse, ImageRequest, ImageResponse, Message};
use crate::client::{Auth, HttpClient};
use crate::config::ImageFamily;
use crate::error::ProviderError;
use crate::provider::{AdapterSettings, ChatAdapter, ImageAdapter, ImageRef};
use async_trait::async_trait;

/// `POST {base}/chat/completions`
#[derive(Debug)]
pub struct OpenAiChat {
    settings: AdapterSettings,
    http: HttpClient,
}

impl OpenAiChat {
    pub fn new(settings: AdapterSettings, http: HttpClient) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl ChatAdapter for OpenAiChat {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn respond(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.settings.system_prompt {
            messages.push(Message::system(system.as_str()));
        }
        messages.push(Message::user(prompt));

        let request = CompletionRequest::new(self.settings.model.clone(), messages)
            .with_temperature(self.settings.temperature);

        let response: CompletionResponse = self
            .http
            .post_json(
                &self.settings.name,
                &self.settings.endpoint("chat/completions"),
                &request,
                Auth::Bearer(self.settings.api_key()),
                &self.settings.headers,
            )
            .await?;

        response
            .content()
            .ok_or_else(|| ProviderError::response(&self.settings.name, "response has no choices"))
    }
}

/// `POST {base}/images/generations`
#[derive(Debug)]
pub struct OpenAiImage {
    settings: AdapterSettings,
    family: ImageFamily,
    http: HttpClient,
}

impl OpenAiImage {
    pub fn new(settings: AdapterSettings, family: ImageFamily, http: HttpClient) -> Self {
        Self {
            settings,
            family,
            http,
        }
    }
}

#[async_trait]
impl ImageAdapter for OpenAiImage {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn family(&self) -> ImageFamily {
        self.family
    }

    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError> {
        let request = ImageRequest::url(&self.settings.model, prompt);

        let response: ImageResponse = self
            .http
            .post_json(
                &self.settings.name,
                &self.settings.endpoint("images/generations"),
                &request,
                Auth::Bearer(self.settings.api_key()),
                &self.settings.headers,
            )
            .await?;

        let first = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::response(&self.settings.name, "response has no data"))?;

        match (first.url, first.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(ImageRef::Url(url)),
            (_, Some(b64)) if !b64.is_empty() => Ok(ImageRef::Base64(b64)),
            _ => Err(ProviderError::response(
                &self.settings.name,
                "image entry carries neither url nor b64_json",
            )),
        }
    }
}
