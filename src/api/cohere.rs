//! Cohere v2 Chat API

use crate::api::completion::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CohereChatRequest {
    pub model: String,
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereChatResponse {
    #[serde(default)]
    pub message: Option<CohereMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereMessage {
    #[serde(default)]
    pub content: Vec<CohereContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereContent {
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

impl CohereChatResponse {
    /// Concatenated text content, if any
    pub fn text(&self) -> Option<String> {
        let message = self.message.as_ref()?;
        let texts: Vec<&str> = message
            .content
            .iter()
            .filter(|c| c.content_type.as_deref().unwrap_or("text") == "text")
            .filter_map(|c| c.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text() {
        let json = r#"{
            "id": "c-1",
            "finish_reason": "COMPLETE",
            "message": {
                "role": "assistant",
                "content": [{"type": "text", "text": "Bonjour"}]
            }
        }"#;
        let response: CohereChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Bonjour"));
    }

    #[test]
    fn test_response_without_message() {
        let response: CohereChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(response.text().is_none());
    }
}
