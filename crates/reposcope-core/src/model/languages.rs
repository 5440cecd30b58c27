use std::collections::BTreeMap;

use crate::model::ids::RepositoryId;

/// Language name → bytes of code, as reported by the hosting service.
///
/// Sorted by language name so serialized output is deterministic.
pub type LanguageHistogram = BTreeMap<String, u64>;

/// The outcome of one language lookup, keyed by the repository it
/// belongs to.
///
/// Produced by a single enrichment worker and consumed exactly once by the
/// collector that merges results back onto the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageResult {
    pub repository_id: RepositoryId,
    pub languages: LanguageHistogram,
}

impl LanguageResult {
    #[must_use]
    pub fn new(repository_id: RepositoryId, languages: LanguageHistogram) -> Self {
        Self {
            repository_id,
            languages,
        }
    }

    /// A result for a repository with nothing to report.
    #[must_use]
    pub fn empty(repository_id: RepositoryId) -> Self {
        Self::new(repository_id, LanguageHistogram::new())
    }
}
