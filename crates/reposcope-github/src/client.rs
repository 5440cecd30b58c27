//! GitHub REST API client.
//!
//! Covers the three endpoints reposcope uses: repository search, the
//! per-repository language breakdown, and the caller's rate-limit status.
//! Quota exhaustion (429, or 403 with `x-ratelimit-remaining: 0` or a
//! `retry-after` hint) is reported as [`SourceError::RateLimited`] so it can
//! be told apart from ordinary failures.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use reposcope_core::model::LanguageHistogram;

use crate::error::{SourceError, SourceResult};
use crate::source::{RateSnapshot, RawRepository, SearchRequest, SourceApi};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = "reposcope/0.1.0 (https://github.com/oxur/reposcope)";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

// ---------------------------------------------------------------------------
// Response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateResources,
}

#[derive(Debug, Deserialize)]
struct RateResources {
    core: RateWindow,
}

#[derive(Debug, Deserialize)]
struct RateWindow {
    limit: u32,
    remaining: u32,
    #[serde(default)]
    reset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// GitHub API client.
///
/// Unauthenticated callers get 60 core calls per hour; a token raises the
/// quota to 5000.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client for the public GitHub API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: Option<String>) -> SourceResult<Self> {
        Self::with_base_url(GITHUB_API_BASE, token)
    }

    /// Create a client against another API root (GitHub Enterprise, test
    /// servers).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> SourceResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> SourceResult<T> {
        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(auth) = self.auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if is_rate_limited(status, response.headers()) {
                return Err(SourceError::RateLimited {
                    reset: reset_from_headers(response.headers()),
                });
            }

            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| SourceError::Parse {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SourceApi for GithubClient {
    async fn search_repositories(
        &self,
        request: &SearchRequest,
    ) -> SourceResult<Vec<RawRepository>> {
        let query = [
            ("q", request.query.clone()),
            ("sort", request.sort.to_string()),
            ("order", request.order.to_string()),
            ("per_page", request.per_page.to_string()),
            ("page", request.page.to_string()),
        ];

        let response: SearchResponse = self.get_json("/search/repositories", &query).await?;
        Ok(response.items)
    }

    async fn list_languages(
        &self,
        owner: &str,
        repository: &str,
    ) -> SourceResult<LanguageHistogram> {
        self.get_json(&format!("/repos/{owner}/{repository}/languages"), &[])
            .await
    }

    async fn rate_limit(&self) -> SourceResult<RateSnapshot> {
        let response: RateLimitResponse = self.get_json("/rate_limit", &[]).await?;
        let core = response.resources.core;

        Ok(RateSnapshot {
            limit: core.limit,
            remaining: core.remaining,
            reset: core.reset.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    if status != StatusCode::FORBIDDEN {
        return false;
    }

    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    exhausted || headers.contains_key("retry-after")
}

fn reset_from_headers(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
