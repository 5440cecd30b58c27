//! GitHub search and language enrichment for reposcope.
//!
//! Implements the source API client, the shared rate budget, the search
//! adapter, and the bounded fan-out that attaches a language breakdown to
//! every repository in a search result.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod aggregate;
pub mod budget;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod search;
pub mod source;

pub use aggregate::Aggregator;
pub use budget::RateBudget;
pub use client::GithubClient;
pub use config::Config;
pub use enrich::{EnrichScheduler, LanguageFetcher};
pub use error::{AggregateError, AggregateResult, SourceError, SourceResult};
pub use search::RepositorySearch;
pub use source::{RateSnapshot, RawRepository, SearchRequest, SourceApi};
