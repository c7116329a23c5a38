//! CLI argument definitions and environment variable handling

use crate::model::DelayProfile;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("both --tls-cert and --tls-key must be provided together for HTTPS support")]
    PartialTls,
    #[error("--delay-steps must be at least 1")]
    NoDelaySteps,
    #[error("--delay-step-ms times --delay-steps overflows the maximum delay")]
    DelayOverflow,
}

/// CLI arguments for the server
#[derive(Parser, Debug)]
#[command(author, version, about = "Mock model server with simulated latency")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Size of one latency step in milliseconds
    #[arg(long, default_value_t = 5)]
    pub delay_step_ms: u64,

    /// Number of discrete latency steps (delay = step * uniform(0..steps))
    #[arg(long, default_value_t = 10)]
    pub delay_steps: u32,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Path to TLS certificate file (PEM format) for HTTPS/HTTP2 support
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format) for HTTPS/HTTP2 support
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

impl Args {
    /// Apply overrides from `MOCK_MODEL_*` environment variables.
    ///
    /// Values that don't parse are ignored and the CLI value is kept.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_env("MOCK_MODEL_PORT") {
            self.port = v;
        }
        if let Some(v) = parse_env("MOCK_MODEL_DELAY_STEP_MS") {
            self.delay_step_ms = v;
        }
        if let Some(v) = parse_env("MOCK_MODEL_DELAY_STEPS") {
            self.delay_steps = v;
        }
        if let Ok(val) = std::env::var("MOCK_MODEL_VERBOSE") {
            // Accept `true`/`false` or `1`/`0`
            match val.as_str() {
                "1" => self.verbose = true,
                "0" => self.verbose = false,
                other => {
                    if let Ok(v) = other.parse::<bool>() {
                        self.verbose = v;
                    }
                }
            }
        }
        if let Ok(val) = std::env::var("MOCK_MODEL_TLS_CERT") {
            self.tls_cert = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("MOCK_MODEL_TLS_KEY") {
            self.tls_key = Some(PathBuf::from(val));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tls_cert.is_some() != self.tls_key.is_some() {
            return Err(ConfigError::PartialTls);
        }
        if self.delay_steps == 0 {
            return Err(ConfigError::NoDelaySteps);
        }
        if self.delay_profile().max_delay().is_none() {
            return Err(ConfigError::DelayOverflow);
        }
        Ok(())
    }

    pub fn delay_profile(&self) -> DelayProfile {
        DelayProfile {
            step: Duration::from_millis(self.delay_step_ms),
            steps: self.delay_steps,
        }
    }
}
