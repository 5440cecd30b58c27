use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::ids::RepositoryId;
use crate::model::languages::LanguageHistogram;

/// A public repository as returned to clients.
///
/// Identity, full name, owner and name are checked at construction and
/// cannot change afterwards. The language histogram starts empty and is
/// filled by the enrichment step through [`RepositoryRecord::with_languages`].
///
/// Serialized as
/// `{"fullName", "owner", "repository", "license"?, "languages"}`; the
/// identity and the primary-language hint are internal only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    #[serde(skip)]
    id: RepositoryId,
    full_name: String,
    owner: String,
    repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip)]
    primary_language: Option<String>,
    languages: LanguageHistogram,
}

impl RepositoryRecord {
    /// Create a record with no license, no language hint and an empty
    /// histogram.
    ///
    /// # Errors
    /// Returns [`Error::InvalidData`] when any of the text fields is empty.
    pub fn new(
        id: RepositoryId,
        full_name: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Result<Self> {
        let full_name = full_name.into();
        let owner = owner.into();
        let repository = repository.into();

        for (field, value) in [
            ("full_name", &full_name),
            ("owner", &owner),
            ("repository", &repository),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidData(format!(
                    "repository {id} has an empty {field}"
                )));
            }
        }

        Ok(Self {
            id,
            full_name,
            owner,
            repository,
            license: None,
            primary_language: None,
            languages: LanguageHistogram::new(),
        })
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn with_primary_language(mut self, language: impl Into<String>) -> Self {
        self.primary_language = Some(language.into());
        self
    }

    /// Attach the language histogram produced by enrichment.
    #[must_use]
    pub fn with_languages(mut self, languages: LanguageHistogram) -> Self {
        self.languages = languages;
        self
    }

    pub fn id(&self) -> RepositoryId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn primary_language(&self) -> Option<&str> {
        self.primary_language.as_deref()
    }

    pub fn languages(&self) -> &LanguageHistogram {
        &self.languages
    }

    /// Whether enrichment has to call out for this repository.
    ///
    /// A missing primary language means the hosting service has no
    /// breakdown to report.
    pub fn needs_language_lookup(&self) -> bool {
        self.primary_language.is_some()
    }
}
