mod agents;
mod competency;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod retry;
mod routes;
mod state;
mod wizard;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::competency::embedding::{Embedder, HashingEmbedder, HttpEmbedder};
use crate::competency::table::load_table;
use crate::competency::CompetencyStore;
use crate::config::{CacheBackend, Config};
use crate::db::create_pool;
use crate::jobs::cache::{EnrichmentCache, MemoryEnrichmentCache, PgEnrichmentCache};
use crate::jobs::failure_log::FailureLog;
use crate::jobs::pipeline::{JobPipeline, PipelineConfig};
use crate::jobs::search::SearchClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::session::{MemorySessionStore, RedisSessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathfinder API v{}", env!("CARGO_PKG_VERSION"));

    // LLM client
    let llm = Arc::new(LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
    )?);
    info!("LLM client initialized ({})", config.llm_api_url);

    // Competency store
    let embedder: Arc<dyn Embedder> = match &config.embedding_api_url {
        Some(url) => {
            info!("Using embeddings endpoint {url}");
            Arc::new(HttpEmbedder::new(
                url.clone(),
                config.embedding_api_key.clone(),
            )?)
        }
        None => {
            info!("EMBEDDING_API_URL not set, using local hashing embedder");
            Arc::new(HashingEmbedder::default())
        }
    };
    let records = load_table(&config.competency_table_path).with_context(|| {
        format!(
            "Failed to load competency table from {}",
            config.competency_table_path.display()
        )
    })?;
    let competencies = Arc::new(CompetencyStore::build(records, embedder).await?);

    // Enrichment cache
    let cache: Arc<dyn EnrichmentCache> = match config.cache_backend {
        CacheBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres cache")?;
            Arc::new(PgEnrichmentCache::new(create_pool(database_url).await?))
        }
        CacheBackend::Memory => {
            info!("Enrichment cache is in-memory; entries are lost on restart");
            Arc::new(MemoryEnrichmentCache::new())
        }
    };

    // Wizard sessions
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis session store initialized");
            Arc::new(RedisSessionStore::new(client, config.session_ttl_secs))
        }
        None => {
            info!("REDIS_URL not set, sessions are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    // Job pipeline
    let search = Arc::new(SearchClient::new(
        config.search_api_url.clone(),
        config.search_api_key.clone(),
    )?);
    let pipeline = JobPipeline::new(
        llm.clone(),
        search,
        cache,
        FailureLog::new(config.failure_log_path.clone()),
        PipelineConfig {
            enrich_max_attempts: config.enrich_max_attempts,
            search_max_retries: config.search_max_retries,
            page_size: config.page_size,
        },
    );

    // Build app state
    let state = AppState {
        llm,
        competencies,
        sessions,
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
