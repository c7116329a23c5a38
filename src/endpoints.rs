//! HTTP endpoint handlers for the mock model API

use crate::model::{complete_async, ModelError, ModelParams};
use crate::tokenizer::{count_tokens, tokenize};
use crate::types::*;
use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use uuid::Uuid;

impl ResponseError for ModelError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModelError::MissingKey(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ModelError::MissingKey(key) => ErrorResponse {
                error: "missing_key".into(),
                key: Some(key.clone()),
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// GET /health
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// POST /v1/run - body is the named-parameter object
pub async fn run_handler(
    state: web::Data<AppState>,
    req: web::Json<ModelParams>,
) -> Result<HttpResponse, ModelError> {
    tracing::info!("running model");
    let prompt = req
        .prompt()
        .inspect_err(|e| tracing::warn!(error = %e, "rejected mock call"))?;
    let output = complete_async(&prompt, &state.delay).await;

    let prompt_tokens = count_tokens(&prompt);
    Ok(HttpResponse::Ok().json(RunResponse {
        id: format!("run-{}", Uuid::new_v4()),
        output,
        prompt_tokens,
    }))
}

/// POST /v1/tokenize
pub async fn tokenize_handler(req: web::Json<TokenizeRequest>) -> impl Responder {
    let tokens = tokenize(&req.text);
    let count = tokens.len();
    HttpResponse::Ok().json(TokenizeResponse { tokens, count })
}

/// Route table shared by the binary, tests and benches
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_handler))
        .route("/v1/run", web::post().to(run_handler))
        .route("/v1/tokenize", web::post().to(tokenize_handler));
}
