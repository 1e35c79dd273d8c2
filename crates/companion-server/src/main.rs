//! Companion server binary.
//!
//! Starts an axum HTTP server with structured logging, optional database
//! initialization, and graceful shutdown on SIGTERM/SIGINT.

use companion_characters::CharacterService;
use companion_chat::{GeminiClient, UtterancePipeline};
use companion_server::{app, config, AppState};
use companion_voice::CommandSynthesizer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("COMPANION_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration: the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize database, if configured
    let pool = match &config.database.path {
        Some(path) => {
            let pool = companion_db::create_pool(path, config.database.runtime_settings())
                .expect("failed to create database pool: check database.path in config");
            {
                let conn = pool
                    .get()
                    .expect("failed to get database connection for migrations");
                let applied =
                    companion_db::run_migrations(&conn).expect("failed to run database migrations");
                if applied > 0 {
                    tracing::info!(count = applied, "applied database migrations");
                }
            }
            Some(pool)
        }
        None => {
            tracing::warn!("database.path not set; character events will report an unconfigured store");
            None
        }
    };

    // Build the chat pipeline
    let model = GeminiClient::new(config.model.gemini())
        .expect("failed to build the chat model HTTP client");
    if !model.has_api_key() {
        tracing::warn!("model.api_key not set; chat messages will fail until GEMINI_API_KEY is provided");
    }
    let synthesizer = CommandSynthesizer::new(config.voice.clone());
    tracing::info!(
        model = %config.model.model,
        engine = %config.voice.engine,
        "chat pipeline configured"
    );
    let pipeline = UtterancePipeline::new(
        Arc::new(model),
        Arc::new(synthesizer),
        config.pipeline_settings(),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        characters: CharacterService::new(pool, config.audio.samples_dir.clone()),
    };

    // Build application
    let app = app(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    tracing::info!(%addr, "starting companion server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address: is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("companion server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
