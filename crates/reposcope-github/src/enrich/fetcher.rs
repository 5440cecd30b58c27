//! Single-repository language lookup.

use std::sync::Arc;

use reposcope_core::model::{LanguageResult, RepositoryId, RepositoryRecord};

use crate::error::AggregateResult;
use crate::source::SourceApi;

/// What a worker needs to look up one repository.
///
/// Owned copies of the record's identifying fields, so a spawned worker
/// never borrows from the batch being enriched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTarget {
    pub id: RepositoryId,
    pub owner: String,
    pub repository: String,
}

impl From<&RepositoryRecord> for LanguageTarget {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            id: record.id(),
            owner: record.owner().to_string(),
            repository: record.repository().to_string(),
        }
    }
}

/// Fetches the language breakdown of one repository.
#[derive(Debug, Clone)]
pub struct LanguageFetcher {
    source: Arc<dyn SourceApi>,
}

impl LanguageFetcher {
    pub fn new(source: Arc<dyn SourceApi>) -> Self {
        Self { source }
    }

    /// One outbound call; the histogram is returned as reported.
    ///
    /// # Errors
    /// Returns the classified source error if the call fails.
    pub async fn fetch(&self, target: &LanguageTarget) -> AggregateResult<LanguageResult> {
        let languages = self
            .source
            .list_languages(&target.owner, &target.repository)
            .await?;
        log::trace!(
            "{}/{}: {} language(s)",
            target.owner,
            target.repository,
            languages.len()
        );
        Ok(LanguageResult::new(target.id, languages))
    }
}
