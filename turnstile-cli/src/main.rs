//! Turnstile CLI — gated demo agents over an OpenAI-compatible backend.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use turnstile::inference::{API_KEY_VAR, OpenAiCompatible, SharedInferenceService};
use turnstile_cli::{Repl, bank_driver, library_driver, support_driver};

/// Available demo personas.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Demo {
    /// Bank agent with credential-gated balance lookup and full gating.
    #[default]
    Bank,
    /// Library assistant with member-gated availability.
    Library,
    /// Ungated support agent.
    Support,
}

/// Turnstile CLI - gated demo agents
#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Demo persona to run
    #[arg(short, long, value_enum, default_value_t = Demo::Bank)]
    demo: Demo,

    /// Model name (overrides TURNSTILE_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("turnstile=debug,turnstile_cli=debug")
    } else {
        EnvFilter::new("turnstile=warn,turnstile_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn build_service(args: &Args) -> anyhow::Result<SharedInferenceService> {
    let mut builder = OpenAiCompatible::builder()
        .api_key(
            std::env::var(API_KEY_VAR)
                .map_err(|_| anyhow::anyhow!("set {API_KEY_VAR} to your API key"))?,
        )
        .timeout_secs(args.timeout);
    if let Ok(base_url) = std::env::var(turnstile::inference::BASE_URL_VAR) {
        builder = builder.base_url(base_url);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    } else if let Ok(model) = std::env::var(turnstile::inference::MODEL_VAR) {
        builder = builder.model(model);
    }
    Ok(Arc::new(builder.build()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Missing credentials are fatal before the first turn.
    let service = build_service(&args)?;

    let repl = match args.demo {
        Demo::Bank => Repl::bank(bank_driver(service)),
        Demo::Library => Repl::library(library_driver(service)),
        Demo::Support => Repl::support(support_driver(service)),
    };

    repl.run().await
}
