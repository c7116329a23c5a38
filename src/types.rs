//! Request and response types for the mock model API

use crate::model::DelayProfile;
use serde::{Deserialize, Serialize};

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Latency model applied to every `/v1/run` call
    pub delay: DelayProfile,
}

/// Mock call response
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub id: String,
    pub output: String,
    pub prompt_tokens: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

/// Tokens borrow from the request text
#[derive(Debug, Serialize)]
pub struct TokenizeResponse<'a> {
    pub tokens: Vec<&'a str>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}
