//! API Module
//!
//! Wire types for the upstream provider APIs.

pub mod cohere;
pub mod completion;
pub mod gemini;
pub mod images;

pub use cohere::{CohereChatRequest, CohereChatResponse};
pub use completion::{CompletionRequest, CompletionResponse, Message, MessageContent};
pub use gemini::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, PredictRequest,
    PredictResponse,
};
pub use images::{ImageRequest, ImageResponse};
