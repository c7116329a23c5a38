//! Mock model library
//!
//! Exposes the mock inference call, the whitespace tokenizer and the HTTP
//! handlers wrapping them, for use in benchmarks and tests.

pub mod args;
pub mod endpoints;
pub mod model;
pub mod tls;
pub mod tokenizer;
pub mod types;

pub use endpoints::*;
pub use model::{
    complete_async, run_model, run_model_async, run_model_with, DelayProfile, ModelError,
    ModelParams,
};
pub use tokenizer::{count_tokens, tokenize};
pub use types::AppState;
