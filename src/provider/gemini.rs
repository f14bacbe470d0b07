//! Google Gemini / Imagen adapters

use crate::api::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, PredictRequest,
    PredictResponse,
};
use crate::client::{Auth, HttpClient};
use crate::config::ImageFamily;
use crate::error::ProviderError;
use crate::provider::{AdapterSettings, ChatAdapter, ImageAdapter, ImageRef};
use async_trait::async_trait;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `POST {base}/models/{model}:generateContent`, text out
#[derive(Debug)]
pub struct GeminiChat {
    settings: AdapterSettings,
    http: HttpClient,
}

impl GeminiChat {
    pub fn new(settings: AdapterSettings, http: HttpClient) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl ChatAdapter for GeminiChat {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn respond(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest::prompt(prompt)
            .with_system(self.settings.system_prompt.as_deref())
            .with_config(GenerationConfig {
                temperature: self.settings.temperature,
                ..Default::default()
            });

        let response = generate_content(&self.settings, &self.http, &request).await?;

        response
            .text()
            .ok_or_else(|| ProviderError::response(&self.settings.name, "no text in response"))
    }
}

/// `generateContent` with IMAGE output modality; yields inline base64
#[derive(Debug)]
pub struct GeminiImage {
    settings: AdapterSettings,
    family: ImageFamily,
    http: HttpClient,
}

impl GeminiImage {
    pub fn new(settings: AdapterSettings, family: ImageFamily, http: HttpClient) -> Self {
        Self {
            settings,
            family,
            http,
        }
    }
}

#[async_trait]
impl ImageAdapter for GeminiImage {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn family(&self) -> ImageFamily {
        self.family
    }

    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError> {
        let request = GenerateContentRequest::prompt(prompt).with_config(GenerationConfig {
            temperature: self.settings.temperature,
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        });

        let response = generate_content(&self.settings, &self.http, &request).await?;

        response
            .inline_image()
            .map(|data| ImageRef::Base64(data.to_string()))
            .ok_or_else(|| {
                ProviderError::response(&self.settings.name, "No image data found in API response")
            })
    }
}

/// `POST {base}/models/{model}:predict`
#[derive(Debug)]
pub struct ImagenImage {
    settings: AdapterSettings,
    family: ImageFamily,
    http: HttpClient,
}

impl ImagenImage {
    pub fn new(settings: AdapterSettings, family: ImageFamily, http: HttpClient) -> Self {
        Self {
            settings,
            family,
            http,
        }
    }
}

#[async_trait]
impl ImageAdapter for ImagenImage {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn family(&self) -> ImageFamily {
        self.family
    }

    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError> {
        let url = self
            .settings
            .endpoint(&format!("models/{}:predict", self.settings.model));

        let response: PredictResponse = self
            .http
            .post_json(
                &self.settings.name,
                &url,
                &PredictRequest::prompt(prompt),
                Auth::Header(API_KEY_HEADER, self.settings.api_key()),
                &self.settings.headers,
            )
            .await?;

        response
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .map(ImageRef::Base64)
            .ok_or_else(|| ProviderError::response(&self.settings.name, "no predictions returned"))
    }
}

async fn generate_content(
    settings: &AdapterSettings,
    http: &HttpClient,
    request: &GenerateContentRequest,
) -> Result<GenerateContentResponse, ProviderError> {
    let url = settings.endpoint(&format!("models/{}:generateContent", settings.model));
    http.post_json(
        &settings.name,
        &url,
        request,
        Auth::Header(API_KEY_HEADER, settings.api_key()),
        &settings.headers,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, ProviderKind};
    use crate::error::ProviderErrorKind;
    use mockito::Matcher;
    use serde_json::json;

    fn settings(base_url: &str, kind: ProviderKind, model: &str) -> AdapterSettings {
        let mut config = ProviderConfig::new("Gemini", kind, "gemini", model, base_url);
        config.temperature = Some(0.7);
        AdapterSettings::from_config(&config, Some("g-key"))
    }

    #[tokio::test]
    async fn test_chat_respond() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Hel"}, {"text": "lo"}]}}]}"#,
            )
            .create_async()
            .await;

        let adapter = GeminiChat::new(
            settings(&server.url(), ProviderKind::GeminiChat, "gemini-1.5-flash"),
            HttpClient::new().unwrap(),
        );
        assert_eq!(adapter.respond("Hi").await.unwrap(), "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_image_inline_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/img:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"parts": [
                    {"text": "A circle"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let adapter = GeminiImage::new(
            settings(&server.url(), ProviderKind::GeminiImage, "img"),
            ImageFamily::Gemini,
            HttpClient::new().unwrap(),
        );
        assert_eq!(
            adapter.generate("a red circle").await.unwrap(),
            ImageRef::Base64("iVBORw0KGgo=".to_string())
        );
    }

    #[tokio::test]
    async fn test_image_without_inline_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/img:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "I can't draw"}]}}]}"#)
            .create_async()
            .await;

        let adapter = GeminiImage::new(
            settings(&server.url(), ProviderKind::GeminiImage, "img"),
            ImageFamily::Gemini,
            HttpClient::new().unwrap(),
        );
        let err = adapter.generate("x").await.unwrap_err();
        assert_eq!(
            err.kind,
            ProviderErrorKind::Response("No image data found in API response".to_string())
        );
    }

    #[tokio::test]
    async fn test_imagen_predict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/imagen-3.0-generate-002:predict")
            .match_header("x-goog-api-key", "g-key")
            .with_status(200)
            .with_body(r#"{"predictions": [{"mimeType": "image/png", "bytesBase64Encoded": "QUJD"}]}"#)
            .create_async()
            .await;

        let adapter = ImagenImage::new(
            settings(
                &server.url(),
                ProviderKind::ImagenImage,
                "imagen-3.0-generate-002",
            ),
            ImageFamily::Imagen,
            HttpClient::new().unwrap(),
        );
        assert_eq!(
            adapter.generate("x").await.unwrap(),
            ImageRef::Base64("QUJD".to_string())
        );
    }
}
