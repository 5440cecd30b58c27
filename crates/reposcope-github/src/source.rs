//! The boundary between reposcope and the repository-hosting API.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use reposcope_core::model::LanguageHistogram;

use crate::error::SourceResult;

/// Largest page the search endpoint serves.
pub const MAX_PER_PAGE: u8 = 100;

/// Operations reposcope needs from the hosting service.
///
/// [`GithubClient`](crate::GithubClient) is the production implementation;
/// tests substitute in-memory fakes.
#[async_trait]
pub trait SourceApi: Send + Sync + fmt::Debug {
    /// Run a repository search and return the raw entries of one page.
    async fn search_repositories(&self, request: &SearchRequest)
        -> SourceResult<Vec<RawRepository>>;

    /// Language breakdown for `owner/repository`.
    async fn list_languages(&self, owner: &str, repository: &str)
        -> SourceResult<LanguageHistogram>;

    /// Current state of the caller's core API quota.
    async fn rate_limit(&self) -> SourceResult<RateSnapshot>;
}

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub sort: &'static str,
    pub order: &'static str,
    pub per_page: u8,
    pub page: u32,
}

impl SearchRequest {
    /// The first full page of `query`, newest repositories first.
    #[must_use]
    pub fn latest(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sort: "created",
            order: "desc",
            per_page: MAX_PER_PAGE,
            page: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw API entries. Every field is optional so validation can report exactly
// what is missing instead of failing deserialization for the whole page.
// ---------------------------------------------------------------------------

/// A repository entry as returned by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepository {
    pub id: Option<u64>,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub owner: Option<RawOwner>,
    pub license: Option<RawLicense>,
    /// Most prevalent language, if the service detected one.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOwner {
    pub login: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLicense {
    /// Short identifier, e.g. `mit` or `apache-2.0`.
    pub key: Option<String>,
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// Snapshot of the core API quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSnapshot {
    /// Calls allowed per hour.
    pub limit: u32,
    /// Calls left in the current window.
    pub remaining: u32,
    /// When the remote window resets.
    pub reset: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    pub fn used(&self) -> u32 {
        self.limit.saturating_sub(self.remaining)
    }
}
