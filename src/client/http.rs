//! HTTP Client
//!
//! Shared async HTTP client used by every provider adapter.

use crate::error::{ProviderError, ProviderErrorKind, RelayError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an upstream body kept in error messages
const MAX_ERROR_BODY: usize = 500;

/// How a provider expects its credential
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <key>`
    Bearer(&'a str),

    /// Key in a custom header, e.g. `x-goog-api-key`
    Header(&'static str, &'a str),
}

impl Auth<'_> {
    fn key(&self) -> &str {
        match self {
            Auth::Bearer(key) | Auth::Header(_, key) => key,
        }
    }
}

/// Thin wrapper over a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // image generation can be slow
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Every failure is reported against `provider`.
    pub async fn post_json<T, R>(
        &self,
        provider: &str,
        url: &str,
        body: &T,
        auth: Auth<'_>,
        extra_headers: &HashMap<String, String>,
    ) -> std::result::Result<R, ProviderError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if auth.key().trim().is_empty() {
            return Err(ProviderError::missing_credential(provider));
        }

        let headers = build_headers(provider, auth, extra_headers)?;

        debug!(provider, url, "sending provider request");

        let resp = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, e))?;

        if !status.is_success() {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::Status {
                    status: status.as_u16(),
                    body: truncate(&text).to_string(),
                },
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::response(
                provider,
                format!("Failed to parse response: {}. Body: {}", e, truncate(&text)),
            )
        })
    }
}

fn build_headers(
    provider: &str,
    auth: Auth<'_>,
    extra_headers: &HashMap<String, String>,
) -> std::result::Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    match auth {
        Auth::Bearer(key) => {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| invalid(provider, "API key format", e))?;
            headers.insert(AUTHORIZATION, value);
        }
        Auth::Header(name, key) => {
            let value = HeaderValue::from_str(key)
                .map_err(|e| invalid(provider, "API key format", e))?;
            headers.insert(HeaderName::from_static(name), value);
        }
    }

    for (name, value) in extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| invalid(provider, "header name", e))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| invalid(provider, "header value", e))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn invalid(provider: &str, what: &str, e: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(
        provider,
        ProviderErrorKind::Request(format!("Invalid {}: {}", what, e)),
    )
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_post_json_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("authorization", "Bearer sk-test")
            .match_header("x-extra", "1")
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let extra: HashMap<String, String> = [("x-extra".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        let value: Value = client
            .post_json(
                "Echo",
                &format!("{}/echo", server.url()),
                &json!({"a": 1}),
                Auth::Bearer("sk-test"),
                &extra,
            )
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_json_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/fail")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .post_json::<_, Value>(
                "Flaky",
                &format!("{}/fail", server.url()),
                &json!({}),
                Auth::Header("x-goog-api-key", "g-key"),
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.provider, "Flaky");
        assert_eq!(
            err.kind,
            ProviderErrorKind::Status {
                status: 503,
                body: "overloaded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let client = HttpClient::new().unwrap();
        let err = client
            .post_json::<_, Value>(
                "NoKey",
                "http://127.0.0.1:9/never",
                &json!({}),
                Auth::Bearer(""),
                &HashMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::MissingCredential);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let body = "é".repeat(400);
        let cut = truncate(&body);
        assert!(cut.len() <= MAX_ERROR_BODY);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
