//! IGDB search client: Apicalypse query construction plus a bounded
//! retry/backoff loop around the games endpoint.
//!
//! Throttling (429) is waited out and retried; any other server rejection is
//! logged with the server's diagnostic body and given up on immediately.
//! Transport and decode errors retry on a shorter delay. All paths share one
//! attempt budget, and an exhausted budget degrades to an empty candidate
//! list so a failing entry can never abort the run.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::igdb::auth::AppToken;
use crate::util::env::env_parse;

const IGDB_GAMES_ENDPOINT: &str = "https://api.igdb.com/v4/games";
const SEARCH_FIELDS: &str = "name,slug,category,platforms.name,cover.image_id,first_release_date";
const DEFAULT_RESULT_LIMIT: usize = 40;

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbPlatformRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbCover {
    #[serde(default)]
    pub image_id: Option<String>,
}

/// One search result from the games endpoint, restricted to the projection the
/// query asks for. Everything but `id` is tolerated missing.
#[derive(Debug, Clone, Deserialize)]
pub struct IgdbCandidate {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub platforms: Option<Vec<IgdbPlatformRef>>,
    #[serde(default)]
    pub cover: Option<IgdbCover>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
}

/// Bounded retry with per-class delays. Attempts are counted across rate-limit
/// waits and transient errors alike.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_delay: Duration,
    pub error_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_delay: Duration::from_millis(1200),
            error_delay: Duration::from_millis(600),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse("IGDB_MAX_RETRIES", defaults.max_attempts),
            rate_limit_delay: Duration::from_millis(env_parse(
                "IGDB_RATE_LIMIT_BACKOFF_MS",
                defaults.rate_limit_delay.as_millis() as u64,
            )),
            error_delay: Duration::from_millis(env_parse(
                "IGDB_ERROR_BACKOFF_MS",
                defaults.error_delay.as_millis() as u64,
            )),
        }
    }
}

/// Raw outcome of one POST to the games endpoint.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Transport seam under the retry loop. Production wraps reqwest; tests script
/// status/body sequences without sockets.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn post_query(&self, body: &str) -> Result<QueryResponse>;
}

pub struct HttpTransport {
    http: Client,
    token: AppToken,
}

impl HttpTransport {
    pub fn new(http: Client, token: AppToken) -> Self {
        Self { http, token }
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn post_query(&self, body: &str) -> Result<QueryResponse> {
        let response = self
            .http
            .post(IGDB_GAMES_ENDPOINT)
            .header("Client-ID", &self.token.client_id)
            .header("Authorization", format!("Bearer {}", self.token.access_token))
            .header("Accept", "application/json")
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(QueryResponse { status, body })
    }
}

/// The orchestrator's view of the search service.
#[async_trait]
pub trait GameSearch: Send + Sync {
    async fn search(&self, title: &str) -> Result<Vec<IgdbCandidate>>;
}

pub struct IgdbClient {
    transport: Box<dyn QueryTransport>,
    policy: RetryPolicy,
    result_limit: usize,
}

impl IgdbClient {
    pub fn new(http: Client, token: AppToken) -> Self {
        let mut client =
            Self::with_transport(Box::new(HttpTransport::new(http, token)), RetryPolicy::from_env());
        client.result_limit = env_parse("IGDB_RESULT_LIMIT", DEFAULT_RESULT_LIMIT);
        client
    }

    pub fn with_transport(transport: Box<dyn QueryTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    fn build_query(&self, title: &str) -> String {
        let escaped = title.replace('"', "\\\"");
        format!(
            "search \"{escaped}\"; fields {SEARCH_FIELDS}; limit {};",
            self.result_limit
        )
    }

    async fn execute(&self, body: &str) -> Vec<IgdbCandidate> {
        let mut attempt = 0u32;
        while attempt < self.policy.max_attempts {
            attempt += 1;
            match self.transport.post_query(body).await {
                Ok(response) if response.status.is_success() => {
                    match serde_json::from_str::<Vec<IgdbCandidate>>(&response.body) {
                        Ok(candidates) => return candidates,
                        Err(err) => {
                            warn!(target = "igdb", attempt, error = %err, "failed to parse search payload");
                            sleep(self.policy.error_delay).await;
                        }
                    }
                }
                Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
                    sleep(self.policy.rate_limit_delay).await;
                }
                Ok(response) => {
                    warn!(
                        target = "igdb",
                        status = %response.status,
                        body = %response.body,
                        "search rejected by server"
                    );
                    return Vec::new();
                }
                Err(err) => {
                    warn!(target = "igdb", attempt, error = %err, "search request error");
                    sleep(self.policy.error_delay).await;
                }
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl GameSearch for IgdbClient {
    async fn search(&self, title: &str) -> Result<Vec<IgdbCandidate>> {
        Ok(self.execute(&self.build_query(title)).await)
    }
}
