use super::AppState;
use crate::error::RelayError;
use crate::{ImageSet, Reply};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::any::Any;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub replies: Vec<Reply>,
}

impl ChatResponse {
    fn error(err: &RelayError) -> Self {
        Self {
            replies: vec![Reply::new("Error", err.to_string())],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageResponse {
    images: ImageSet,
}

/// Decode a JSON body whatever its content type; an empty body is `{}`
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| RelayError::Validation(format!("Invalid JSON body: {}", e)))
}

pub(super) async fn chat(State(state): State<AppState>, body: Bytes) -> Json<ChatResponse> {
    let req: ChatRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "rejected chat request");
            return Json(ChatResponse::error(&e));
        }
    };
    let message = req.message.unwrap_or_default();
    info!(message = %message, "received chat message");

    match state.relay.chat(&message).await {
        Ok(replies) => {
            info!(replies = replies.len(), "chat complete");
            Json(ChatResponse { replies })
        }
        Err(e) => {
            error!(error = %e, "chat dispatch failed");
            Json(ChatResponse::error(&e))
        }
    }
}

pub(super) async fn generate_image(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_body::<ImageRequest>(&body) {
        Ok(req) => {
            let prompt = req.prompt.unwrap_or_default();
            info!(prompt = %prompt, "received image prompt");
            state.relay.generate_images(&prompt).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(images) => Json(ImageResponse { images }).into_response(),
        Err(RelayError::Validation(msg)) => {
            warn!(error = %msg, "rejected image request");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "image dispatch failed");
            Json(json!({ "error": e.to_string() })).into_response()
        }
    }
}

pub(super) async fn wake() -> Json<serde_json::Value> {
    Json(json!({ "status": "awake" }))
}

pub(super) fn chat_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let err = RelayError::Aggregate(panic_message(&*payload));
    error!(error = %err, "chat handler panicked");
    Json(ChatResponse::error(&err)).into_response()
}

pub(super) fn image_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let err = RelayError::Aggregate(panic_message(&*payload));
    error!(error = %err, "image handler panicked");
    Json(json!({ "error": err.to_string() })).into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
