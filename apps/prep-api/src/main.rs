mod config;
mod errors;
mod generation;
mod llm_client;
mod profile;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionBackend, LlmClient};
use crate::profile::pipeline::{self, RunOptions};
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "prep-api",
    version,
    about = "Personalized interview-prep pages from admin console exports, plus the resume generation API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a personalized prep page from an admin console export
    Run {
        /// Admin console export JSON
        admin_export: PathBuf,
        /// Candidate resume (.txt or .pdf)
        resume: Option<PathBuf>,
        /// Output directory (overrides OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Base HTML template (overrides BASE_TEMPLATE_FILE)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
    /// Start the HTTP service
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Load configuration first (fails on malformed values, never on absent ones)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("prep_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match command {
        Commands::Run {
            admin_export,
            resume,
            output_dir,
            template,
        } => run_pipeline(config, admin_export, resume, output_dir, template),
        Commands::Serve => serve(config).await,
    }
}

fn run_pipeline(
    config: Config,
    admin_export: PathBuf,
    resume: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    template: Option<PathBuf>,
) -> Result<()> {
    info!("Personalized HTML generator v{}", env!("CARGO_PKG_VERSION"));

    let table = config.skill_topic_map()?;
    if table.is_empty() {
        warn!("Skill map is empty; no technical topics will be mapped");
    }
    let matcher = config.topic_matcher.build();
    info!(
        "Skill map: {} keywords, matcher: {}",
        table.len(),
        matcher.name()
    );

    let mut opts = RunOptions::from_config(&config);
    if let Some(dir) = output_dir {
        opts.output_dir = dir;
    }
    if let Some(path) = template {
        opts.base_template = path;
    }

    pipeline::run(
        &admin_export,
        resume.as_deref(),
        &opts,
        &table,
        matcher.as_ref(),
    )
    .map(|_| ())
    .map_err(|e| {
        error!("{e}");
        anyhow::Error::new(e).context("Generation failed")
    })
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting prep-api v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional; requests fail individually without a key)
    let llm: Option<Arc<dyn CompletionBackend>> = match &config.openai_api_key {
        Some(key) => {
            let client: Arc<dyn CompletionBackend> =
                Arc::new(LlmClient::new(key.clone()).context("Failed to build HTTP client")?);
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY is not set; resume generation requests will fail");
            None
        }
    };

    if tokio::fs::metadata(&config.resume_template_path).await.is_err() {
        warn!(
            "Resume template {} not found; resume generation requests will fail",
            config.resume_template_path.display()
        );
    }

    let state = AppState {
        llm,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
