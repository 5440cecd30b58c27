//! The end-to-end latest-repositories operation.

use std::sync::Arc;

use reposcope_core::model::{RepositoryRecord, SearchQuery};

use crate::budget::RateBudget;
use crate::enrich::{EnrichScheduler, LanguageFetcher};
use crate::error::{AggregateError, AggregateResult};
use crate::search::RepositorySearch;
use crate::source::SourceApi;

/// Search, admission checks and enrichment behind a single call.
///
/// Every outbound call is paid for from the shared [`RateBudget`] before it
/// is made. A request that cannot be paid for in full fails without making
/// the calls, so clients never receive a partially enriched page.
#[derive(Debug, Clone)]
pub struct Aggregator {
    search: RepositorySearch,
    scheduler: EnrichScheduler,
    budget: Arc<RateBudget>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn SourceApi>, budget: Arc<RateBudget>, concurrency: usize) -> Self {
        Self {
            search: RepositorySearch::new(Arc::clone(&source)),
            scheduler: EnrichScheduler::new(LanguageFetcher::new(source), concurrency),
            budget,
        }
    }

    pub fn budget(&self) -> &RateBudget {
        &self.budget
    }

    /// The newest public repositories matching `query`, each with its
    /// language breakdown.
    ///
    /// # Errors
    /// - [`AggregateError::RateLimitReached`] when the budget cannot cover
    ///   the search, or the lookups the results need
    /// - [`AggregateError::InvalidData`] when a search entry is malformed
    /// - [`AggregateError::Source`] when the search call fails
    pub async fn latest_repositories(
        &self,
        query: &SearchQuery,
    ) -> AggregateResult<Vec<RepositoryRecord>> {
        if !self.budget.allow() {
            return Err(AggregateError::RateLimitReached {
                phase: "search",
                requested: 1,
            });
        }

        let records = self.search.latest(query).await?;

        let lookups = records
            .iter()
            .filter(|record| record.needs_language_lookup())
            .count();
        let lookups = u32::try_from(lookups).unwrap_or(u32::MAX);
        if !self.budget.allow_n(lookups) {
            return Err(AggregateError::RateLimitReached {
                phase: "enrichment",
                requested: lookups,
            });
        }

        log::debug!(
            "Enriching {} of {} repositories ({} slot(s))",
            lookups,
            records.len(),
            self.scheduler.concurrency()
        );
        Ok(self.scheduler.enrich(records).await)
    }
}
