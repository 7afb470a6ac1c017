// src/main.rs

use academy::config::Config;
use academy::routes;
use academy::services::Academy;
use academy::services::certificate::{DocumentStore, HttpDocumentStore, MemoryDocumentStore};
use academy::services::quiz_generator::{DisabledGenerator, GeminiClient, QuestionGenerator};
use academy::state::AppState;
use academy::store::sqlite::SqliteStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "academy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Open the key-value store with retry
    let mut retry_count = 0;
    let store = loop {
        match SqliteStore::connect(&config.database_url).await {
            Ok(store) => break store,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to open store after 5 retries: {:?}", e);
                }
                tracing::warn!("Store not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    tracing::info!("Store opened at {}", config.database_url);

    let documents: Arc<dyn DocumentStore> = match &config.certificate_store_url {
        Some(url) => Arc::new(HttpDocumentStore::new(url.clone())),
        None => {
            tracing::warn!("CERTIFICATE_STORE_URL not set, certificates are kept in memory");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let generator: Arc<dyn QuestionGenerator> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone())),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, quiz generation is disabled");
            Arc::new(DisabledGenerator)
        }
    };

    let academy = Arc::new(Academy::new(Arc::new(store), documents, generator, &config));
    if let Err(e) = academy.initialize().await {
        panic!("Failed to seed the academy store: {:?}", e);
    }
    tracing::info!("Directory and attendance ledger ready.");

    let state = AppState {
        academy,
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", addr, e));

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
