//! Provider Configuration
//!
//! Defines the configuration schema for chat and image providers.

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Chat providers, in reply order
    #[serde(default)]
    pub chat: Vec<ProviderConfig>,

    /// Image providers
    #[serde(default)]
    pub images: Vec<ProviderConfig>,
}

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions`
    OpenaiChat,
    /// Google `generateContent`
    GeminiChat,
    /// Cohere v2 `/chat`
    CohereChat,
    /// Google `generateContent` with image output modality
    GeminiImage,
    /// OpenAI-compatible `/images/generations`
    OpenaiImage,
    /// Google Imagen `:predict`
    ImagenImage,
}

impl ProviderKind {
    pub fn is_chat(&self) -> bool {
        matches!(
            self,
            ProviderKind::OpenaiChat | ProviderKind::GeminiChat | ProviderKind::CohereChat
        )
    }
}

/// Output slot an image provider fills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImageFamily {
    /// The single inline base64 image
    Gemini,
    Dalle,
    Imagen,
    Flux,
}

/// Configuration for a single provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name, used as the reply's `model` field
    pub name: String,

    pub kind: ProviderKind,

    /// Credential family; keys come from `{FAMILY}_API_KEY_1/2`
    pub family: String,

    /// Model identifier sent to the provider
    pub model: String,

    /// Base URL for the API
    pub base_url: String,

    /// Optional environment variable for custom base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url_env: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Optional system prompt sent before the user's message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Which output list an image provider feeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_family: Option<ImageFamily>,

    /// Number of parallel calls for this provider (image providers only)
    #[serde(default = "default_count", skip_serializing_if = "is_one")]
    pub count: u32,

    /// Additional headers to send with requests
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Disabled providers are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_count() -> u32 {
    1
}

fn is_one(n: &u32) -> bool {
    *n == 1
}

fn default_enabled() -> bool {
    true
}

impl ProviderConfig {
    /// Minimal enabled provider; everything else at defaults
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        family: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            family: family.into(),
            model: model.into(),
            base_url: base_url.into(),
            base_url_env: None,
            temperature: None,
            system_prompt: None,
            image_family: None,
            count: default_count(),
            headers: HashMap::new(),
            enabled: default_enabled(),
        }
    }

    pub fn with_image_family(mut self, family: ImageFamily) -> Self {
        self.image_family = Some(family);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Get the effective base URL (from env var if configured, otherwise default)
    pub fn get_base_url(&self) -> String {
        if let Some(env_var) = &self.base_url_env {
            if let Ok(url) = std::env::var(env_var) {
                return url;
            }
        }
        self.base_url.clone()
    }

    /// Image family, defaulting by kind when not set explicitly
    pub fn effective_image_family(&self) -> Option<ImageFamily> {
        self.image_family.or(match self.kind {
            ProviderKind::GeminiImage => Some(ImageFamily::Gemini),
            ProviderKind::ImagenImage => Some(ImageFamily::Imagen),
            _ => None,
        })
    }
}

impl ProvidersConfig {
    /// Enabled chat providers
    pub fn chat_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.chat.iter().filter(|p| p.enabled)
    }

    /// Enabled image providers
    pub fn image_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.images.iter().filter(|p| p.enabled)
    }

    /// All credential families referenced by enabled providers
    pub fn families(&self) -> BTreeSet<String> {
        self.chat_providers()
            .chain(self.image_providers())
            .map(|p| p.family.to_lowercase())
            .collect()
    }

    /// Check structural consistency
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for p in &self.chat {
            if !p.kind.is_chat() {
                return Err(RelayError::Config(format!(
                    "Chat provider '{}' has image kind {:?}",
                    p.name, p.kind
                )));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(RelayError::Config(format!(
                    "Duplicate chat provider '{}'",
                    p.name
                )));
            }
        }

        seen.clear();
        for p in &self.images {
            if p.kind.is_chat() {
                return Err(RelayError::Config(format!(
                    "Image provider '{}' has chat kind {:?}",
                    p.name, p.kind
                )));
            }
            if p.effective_image_family().is_none() {
                return Err(RelayError::Config(format!(
                    "Image provider '{}' needs an image_family",
                    p.name
                )));
            }
            if p.count == 0 {
                return Err(RelayError::Config(format!(
                    "Image provider '{}' has count 0",
                    p.name
                )));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(RelayError::Config(format!(
                    "Duplicate image provider '{}'",
                    p.name
                )));
            }
        }

        let inline = self
            .image_providers()
            .filter(|p| p.effective_image_family() == Some(ImageFamily::Gemini))
            .map(|p| p.count as usize)
            .sum::<usize>();
        if inline > 1 {
            return Err(RelayError::Config(
                "At most one inline (gemini) image call may be configured".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, kind: ProviderKind) -> ProviderConfig {
        ProviderConfig::new(name, kind, "test", "m", "https://api.example.com")
    }

    #[test]
    fn test_deserialize_provider_config() {
        let json = r#"{
            "name": "Mistral",
            "kind": "openai_chat",
            "family": "mistral",
            "model": "mistral-tiny",
            "base_url": "https://api.mistral.ai/v1",
            "temperature": 0.7
        }"#;

        let config: ProviderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind, ProviderKind::OpenaiChat);
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.count, 1);
        assert!(config.enabled);
    }

    #[test]
    fn test_base_url_env_override() {
        let mut config = provider("Custom", ProviderKind::OpenaiChat);
        config.base_url_env = Some("POLYRELAY_TEST_BASE_URL".to_string());

        std::env::remove_var("POLYRELAY_TEST_BASE_URL");
        assert_eq!(config.get_base_url(), "https://api.example.com");

        std::env::set_var("POLYRELAY_TEST_BASE_URL", "http://localhost:9999");
        assert_eq!(config.get_base_url(), "http://localhost:9999");
        std::env::remove_var("POLYRELAY_TEST_BASE_URL");
    }

    #[test]
    fn test_validate_rejects_mixed_kinds() {
        let config = ProvidersConfig {
            chat: vec![provider("Img", ProviderKind::OpenaiImage)],
            images: vec![],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_image_family() {
        let config = ProvidersConfig {
            chat: vec![],
            images: vec![provider("DALL-E", ProviderKind::OpenaiImage)],
        };
        assert!(config.validate().is_err());

        let dalle =
            provider("DALL-E", ProviderKind::OpenaiImage).with_image_family(ImageFamily::Dalle);
        let config = ProvidersConfig {
            chat: vec![],
            images: vec![dalle, provider("Gemini", ProviderKind::GeminiImage)],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_families_skip_disabled() {
        let mut off = provider("Off", ProviderKind::CohereChat);
        off.family = "cohere".to_string();
        off.enabled = false;

        let mut on = provider("On", ProviderKind::GeminiChat);
        on.family = "GEMINI".to_string();

        let config = ProvidersConfig {
            chat: vec![off, on],
            images: vec![],
        };
        let families: Vec<_> = config.families().into_iter().collect();
        assert_eq!(families, vec!["gemini".to_string()]);
    }
}
