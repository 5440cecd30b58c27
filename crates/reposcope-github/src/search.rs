//! Repository search adapter.
//!
//! Translates raw search entries into validated [`RepositoryRecord`]s. A
//! single malformed entry rejects the whole page.

use std::sync::Arc;

use reposcope_core::model::{RepositoryId, RepositoryRecord, SearchQuery};
use reposcope_core::Error;

use crate::error::AggregateResult;
use crate::source::{RawRepository, SearchRequest, SourceApi};

/// Runs the latest-repositories search against a [`SourceApi`].
#[derive(Debug, Clone)]
pub struct RepositorySearch {
    source: Arc<dyn SourceApi>,
}

impl RepositorySearch {
    pub fn new(source: Arc<dyn SourceApi>) -> Self {
        Self { source }
    }

    /// The newest public repositories matching `query`, in the order the
    /// source returned them.
    ///
    /// Makes exactly one outbound call.
    ///
    /// # Errors
    /// Returns an error if the call fails or any entry lacks an identity,
    /// full name, owner login or repository name.
    pub async fn latest(&self, query: &SearchQuery) -> AggregateResult<Vec<RepositoryRecord>> {
        let request = SearchRequest::latest(query.to_query());
        log::debug!("Searching repositories: {}", request.query);

        let raw = self.source.search_repositories(&request).await?;
        log::debug!("Search returned {} repositories", raw.len());

        let records = raw
            .into_iter()
            .enumerate()
            .map(|(index, entry)| to_record(index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Validate one raw entry.
fn to_record(index: usize, raw: RawRepository) -> Result<RepositoryRecord, Error> {
    let id = raw.id.ok_or(Error::MissingField { field: "id", index })?;
    let full_name = required(raw.full_name, "full_name", index)?;
    let owner = required(
        raw.owner.and_then(|owner| owner.login),
        "owner.login",
        index,
    )?;
    let repository = required(raw.name, "name", index)?;

    let mut record = RepositoryRecord::new(RepositoryId::new(id), full_name, owner, repository)?;

    if let Some(license) = raw.license {
        record = record.with_license(license.key.unwrap_or_default());
    }
    if let Some(language) = raw.language.filter(|l| !l.is_empty()) {
        record = record.with_primary_language(language);
    }

    Ok(record)
}

fn required(value: Option<String>, field: &'static str, index: usize) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField { field, index })
}
