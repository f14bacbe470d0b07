//! Client Module
//!
//! HTTP client shared by provider adapters.

pub mod http;

pub use http::{Auth, HttpClient};
