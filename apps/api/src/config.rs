use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Where enriched jobs are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Postgres,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(CacheBackend::Postgres),
            "memory" => Ok(CacheBackend::Memory),
            other => bail!("CACHE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or numbers do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub search_api_url: String,
    pub search_api_key: String,
    pub cache_backend: CacheBackend,
    /// Required when `cache_backend` is Postgres.
    pub database_url: Option<String>,
    /// Sessions live in memory when unset.
    pub redis_url: Option<String>,
    /// The local hashing embedder is used when unset.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub competency_table_path: PathBuf,
    pub failure_log_path: PathBuf,
    pub enrich_max_attempts: u32,
    pub search_max_retries: u32,
    pub page_size: usize,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let cache_backend = match var("CACHE_BACKEND") {
            Some(v) => v.parse()?,
            None => CacheBackend::Postgres,
        };
        let database_url = var("DATABASE_URL");
        if cache_backend == CacheBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set (CACHE_BACKEND=postgres)");
        }

        Ok(Config {
            llm_api_url: require("LLM_API_URL")?,
            llm_api_key: require("LLM_API_KEY")?,
            search_api_url: require("SEARCH_API_URL")?,
            search_api_key: require("SEARCH_API_KEY")?,
            cache_backend,
            database_url,
            redis_url: var("REDIS_URL"),
            embedding_api_url: var("EMBEDDING_API_URL"),
            embedding_api_key: var("EMBEDDING_API_KEY"),
            competency_table_path: var("COMPETENCY_TABLE_PATH")
                .unwrap_or_else(|| "data/direktori_komp.csv".to_string())
                .into(),
            failure_log_path: var("FAILURE_LOG_PATH")
                .unwrap_or_else(|| "logs/enrichment_failures.log".to_string())
                .into(),
            enrich_max_attempts: parse_or(&var, "ENRICH_MAX_ATTEMPTS", 3)?,
            search_max_retries: parse_or(&var, "SEARCH_MAX_RETRIES", 3)?,
            page_size: parse_or(&var, "PAGE_SIZE", 5)?,
            session_ttl_secs: parse_or(&var, "SESSION_TTL_SECS", 86_400)?,
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
