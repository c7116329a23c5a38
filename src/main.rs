//! Mock model server
//!
//! Serves a stand-in for a model inference call plus a whitespace tokenizer:
//! - POST /v1/run (named parameters in, `<prompt> : <10 digits>` out, after a
//!   random delay of `step * uniform(0..steps)`)
//! - POST /v1/tokenize
//! - GET /health
//! - HTTP/2 support with TLS certificates
//!
//! Usage:
//!   Run (HTTP):
//!     ./target/release/mock-model --port 3000 --delay-step-ms 5 --delay-steps 10
//!   Run (HTTPS/HTTP2):
//!     ./target/release/mock-model --port 3000 --tls-cert cert.pem --tls-key key.pem

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use mock_model::{args::Args, endpoints::configure, tls, AppState};
use tracing_subscriber::EnvFilter;

extern crate jemallocator;

#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    // Allow environment variables to override parameters set on the CLI
    args.apply_env_overrides();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    args.validate().context("configuration error")?;

    let protocol = if args.tls_cert.is_some() {
        "HTTPS/HTTP2"
    } else {
        "HTTP"
    };
    tracing::info!(port = args.port, protocol, "starting mock-model");
    tracing::debug!(?args, "configuration");

    let app_state = web::Data::new(AppState {
        delay: args.delay_profile(),
    });
    let bind_addr = format!("0.0.0.0:{}", args.port);

    let server = HttpServer::new(move || App::new().app_data(app_state.clone()).configure(configure));

    let server = if let (Some(cert_path), Some(key_path)) = (&args.tls_cert, &args.tls_key) {
        tracing::info!(
            cert = %cert_path.display(),
            key = %key_path.display(),
            "loading TLS certificates"
        );
        let server_config =
            tls::load_server_config(cert_path, key_path).context("TLS configuration error")?;
        tracing::info!("HTTP/2 enabled (ALPN protocols: h2, http/1.1)");
        server.bind_rustls_0_23(&bind_addr, server_config)?
    } else {
        tracing::info!("running without TLS (HTTP only)");
        server.bind(&bind_addr)?
    };

    server.run().await?;
    Ok(())
}
