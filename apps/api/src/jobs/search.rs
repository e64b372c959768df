//! Job search connector for a Google-Jobs style search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::job::RawJobPosting;
use crate::retry::{retry, RetryPolicy};

const SEARCH_ENGINE: &str = "google_jobs";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("search API returned no postings")]
    NoResults,
}

/// Search seam. Never fails: transport trouble and empty result lists both
/// end in an empty `Vec` once retries are spent.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &str, max_retries: u32) -> Vec<RawJobPosting>;
}

/// Response body. Providers put postings under `jobs` or `results`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    jobs: Option<Vec<RawJobPosting>>,
    results: Option<Vec<RawJobPosting>>,
}

impl SearchResponse {
    fn into_postings(self) -> Vec<RawJobPosting> {
        match self.jobs {
            Some(jobs) if !jobs.is_empty() => jobs,
            _ => self.results.unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_url,
            api_key,
        })
    }

    async fn search_once(&self, query: &str) -> Result<Vec<RawJobPosting>, SearchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("engine", SEARCH_ENGINE),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let postings = response.json::<SearchResponse>().await?.into_postings();
        if postings.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(postings)
    }
}

#[async_trait]
impl JobSearch for SearchClient {
    async fn search(&self, query: &str, max_retries: u32) -> Vec<RawJobPosting> {
        match retry(RetryPolicy::new(max_retries), "Job search", move |_| {
            self.search_once(query)
        })
        .await
        {
            Ok(postings) => {
                info!("Search for '{query}' returned {} posting(s)", postings.len());
                postings
            }
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        }
    }
}
