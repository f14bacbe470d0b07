//! Cohere chat adapter

use crate::api::{CohereChatRequest, CohereChatResponse, Message};
use crate::client::{Auth, HttpClient};
use crate::error::ProviderError;
use crate::provider::{AdapterSettings, ChatAdapter};
use async_trait::async_trait;

/// `POST {base}/chat` (Cohere v2)
#[derive(Debug)]
pub struct CohereChat {
    settings: AdapterSettings,
    http: HttpClient,
}

impl CohereChat {
    pub fn new(settings: AdapterSettings, http: HttpClient) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl ChatAdapter for CohereChat {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn respond(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.settings.system_prompt {
            messages.push(Message::system(system.as_str()));
        }
        messages.push(Message::user(prompt));

        let request = CohereChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
        };

        let response: CohereChatResponse = self
            .http
            .post_json(
                &self.settings.name,
                &self.settings.endpoint("chat"),
                &request,
                Auth::Bearer(self.settings.api_key()),
                &self.settings.headers,
            )
            .await?;

        response
            .text()
            .ok_or_else(|| ProviderError::response(&self.settings.name, "no text in response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, ProviderKind};
    use crate::error::ProviderErrorKind;

    fn adapter(base_url: &str) -> CohereChat {
        let config = ProviderConfig::new(
            "Cohere",
            ProviderKind::CohereChat,
            "cohere",
            "command-r-plus",
            base_url,
        );
        CohereChat::new(
            AdapterSettings::from_config(&config, Some("co-1")),
            HttpClient::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_respond() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer co-1")
            .with_status(200)
            .with_body(r#"{"message": {"role": "assistant", "content": [{"type": "text", "text": "Hi there"}]}}"#)
            .create_async()
            .await;

        assert_eq!(adapter(&server.url()).respond("Hi").await.unwrap(), "Hi there");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(401)
            .with_body(r#"{"message": "invalid api token"}"#)
            .create_async()
            .await;

        let err = adapter(&server.url()).respond("Hi").await.unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Status { status: 401, .. }));
    }
}
