//! Language enrichment for search results.

pub mod fetcher;
pub mod scheduler;

pub use fetcher::{LanguageFetcher, LanguageTarget};
pub use scheduler::{EnrichScheduler, DEFAULT_CONCURRENCY};
