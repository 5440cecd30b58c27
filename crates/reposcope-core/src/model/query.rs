use serde::{Deserialize, Serialize};

/// Qualifier restricting every search to public repositories.
const PUBLIC_QUALIFIER: &str = "is:public";

/// Optional filters for the latest-repositories search.
///
/// Bound from the `owner`, `license` and `language` query parameters of an
/// incoming request. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Render the filters in the hosting service's search syntax,
    /// e.g. `is:public owner:rust-lang language:Rust`.
    ///
    /// Always scoped to public repositories; a filter appears only when its
    /// value is non-empty.
    pub fn to_query(&self) -> String {
        let mut query = String::from(PUBLIC_QUALIFIER);
        query.push(' ');

        for (qualifier, value) in [
            ("owner", &self.owner),
            ("license", &self.license),
            ("language", &self.language),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push_str(qualifier);
                query.push(':');
                query.push_str(value);
                query.push(' ');
            }
        }

        query.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_query_is_public_only() {
        assert_eq!(SearchQuery::new().to_query(), "is:public");
    }

    #[test]
    fn test_all_filters_in_fixed_order() {
        let query = SearchQuery::new()
            .with_language("Go")
            .with_owner("test-owner")
            .with_license("mit");
        assert_eq!(
            query.to_query(),
            "is:public owner:test-owner license:mit language:Go"
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let query = SearchQuery::new().with_owner("").with_language("Rust");
        assert_eq!(query.to_query(), "is:public language:Rust");
    }

    #[test]
    fn test_deserializes_missing_fields_as_none() {
        let query: SearchQuery = serde_json::from_str(r#"{"language":"Java"}"#).unwrap();
        assert_eq!(query, SearchQuery::new().with_language("Java"));
    }

    fn filter() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-Za-z0-9_.-]{0,12}")
    }

    proptest! {
        #[test]
        fn prop_query_is_public_and_trimmed(owner in filter(), license in filter(), language in filter()) {
            let query = SearchQuery { owner: owner.clone(), license: license.clone(), language: language.clone() };
            let rendered = query.to_query();

            prop_assert!(rendered.starts_with("is:public"));
            prop_assert_eq!(rendered.trim_end(), rendered.as_str());

            for (qualifier, value) in [("owner", owner), ("license", license), ("language", language)] {
                let prefix = format!("{qualifier}:");
                match value.filter(|v| !v.is_empty()) {
                    Some(v) => {
                        let expected = format!("{qualifier}:{v}");
                        prop_assert!(rendered.split(' ').any(|part| part == expected));
                    }
                    None => prop_assert!(!rendered.split(' ').any(|part| part.starts_with(&prefix))),
                }
            }
        }
    }
}
