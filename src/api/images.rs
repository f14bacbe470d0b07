//! OpenAI-compatible Image Generation API

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub response_format: String,
}

impl ImageRequest {
    pub fn url(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            n: 1,
            response_format: "url".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_url() {
        let json = r#"{"created": 1, "data": [{"url": "https://img.example/a.png", "revised_prompt": "x"}]}"#;
        let response: ImageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.data[0].url.as_deref(),
            Some("https://img.example/a.png")
        );
        assert!(response.data[0].b64_json.is_none());
    }
}
