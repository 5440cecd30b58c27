//! End-to-end tests for the latest-repositories operation.
//!
//! These tests drive [`Aggregator`] against an in-memory source so admission,
//! validation and enrichment can be checked without real GitHub calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reposcope_core::model::{LanguageHistogram, SearchQuery};
use reposcope_core::ErrorCode;
use reposcope_github::source::{RawLicense, RawOwner};
use reposcope_github::{
    AggregateError, Aggregator, RateBudget, RateSnapshot, RawRepository, SearchRequest,
    SourceApi, SourceError, SourceResult,
};

/// Scripted source that counts calls and tracks lookups in flight.
#[derive(Debug, Default)]
struct FakeSource {
    repositories: Vec<RawRepository>,
    languages: HashMap<String, LanguageHistogram>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    search_error: Option<fn() -> SourceError>,
    search_calls: AtomicUsize,
    language_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    last_query: parking_lot::Mutex<Option<String>>,
}

impl FakeSource {
    fn with_repository(mut self, repository: RawRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    fn with_languages(mut self, name: &str, languages: &[(&str, u64)]) -> Self {
        let histogram = languages
            .iter()
            .map(|(language, bytes)| ((*language).to_string(), *bytes))
            .collect();
        self.languages.insert(name.to_string(), histogram);
        self
    }

    fn with_delay(mut self, name: &str, millis: u64) -> Self {
        self.delays
            .insert(name.to_string(), Duration::from_millis(millis));
        self
    }

    fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn language_calls(&self) -> usize {
        self.language_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceApi for FakeSource {
    async fn search_repositories(
        &self,
        request: &SearchRequest,
    ) -> SourceResult<Vec<RawRepository>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(request.query.clone());
        if let Some(error) = self.search_error {
            return Err(error());
        }
        Ok(self.repositories.clone())
    }

    async fn list_languages(
        &self,
        _owner: &str,
        repository: &str,
    ) -> SourceResult<LanguageHistogram> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(repository)
            .copied()
            .unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(repository) {
            return Err(SourceError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(self.languages.get(repository).cloned().unwrap_or_default())
    }

    async fn rate_limit(&self) -> SourceResult<RateSnapshot> {
        Ok(RateSnapshot {
            limit: 60,
            remaining: 60,
            reset: None,
        })
    }
}

fn repository(id: u64, name: &str, language: Option<&str>) -> RawRepository {
    RawRepository {
        id: Some(id),
        full_name: Some(format!("test-owner/{name}")),
        name: Some(name.to_string()),
        owner: Some(RawOwner {
            login: Some("test-owner".to_string()),
        }),
        license: None,
        language: language.map(str::to_string),
    }
}

fn aggregator(source: &Arc<FakeSource>, capacity: u32, concurrency: usize) -> Aggregator {
    let source: Arc<dyn SourceApi> = Arc::clone(source) as Arc<dyn SourceApi>;
    Aggregator::new(source, Arc::new(RateBudget::new(capacity)), concurrency)
}

#[tokio::test]
async fn test_single_repository_is_enriched() {
    let mut raw = repository(1, "repo1", Some("Go"));
    raw.license = Some(RawLicense {
        key: Some("mit".to_string()),
        ..RawLicense::default()
    });
    let source = Arc::new(
        FakeSource::default()
            .with_repository(raw)
            .with_languages("repo1", &[("Go", 10)]),
    );

    let records = aggregator(&source, 60, 8)
        .latest_repositories(&SearchQuery::new().with_language("Go"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "fullName": "test-owner/repo1",
            "owner": "test-owner",
            "repository": "repo1",
            "license": "mit",
            "languages": {"Go": 10}
        })
    );
    assert_eq!(
        source.last_query.lock().as_deref(),
        Some("is:public language:Go")
    );
    assert_eq!(source.search_calls(), 1);
    assert_eq!(source.language_calls(), 1);
}

#[tokio::test]
async fn test_missing_owner_rejects_whole_page() {
    let mut broken = repository(2, "repo2", Some("Go"));
    broken.owner = None;
    let source = Arc::new(
        FakeSource::default()
            .with_repository(repository(1, "repo1", Some("Go")))
            .with_repository(broken),
    );

    let err = aggregator(&source, 60, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidDataFound);
    assert_eq!(source.language_calls(), 0);
}

#[tokio::test]
async fn test_budget_refusal_before_enrichment_makes_no_lookups() {
    // One token pays for the search; two lookups cannot be covered.
    let source = Arc::new(
        FakeSource::default()
            .with_repository(repository(1, "repo1", Some("Go")))
            .with_repository(repository(2, "repo2", Some("Rust"))),
    );

    let err = aggregator(&source, 1, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AggregateError::RateLimitReached {
            phase: "enrichment",
            requested: 2
        }
    ));
    assert_eq!(err.code(), ErrorCode::RateLimitReached);
    assert_eq!(source.search_calls(), 1);
    assert_eq!(source.language_calls(), 0);
}

#[tokio::test]
async fn test_budget_refusal_before_search_makes_no_calls() {
    let source = Arc::new(
        FakeSource::default().with_repository(repository(1, "repo1", Some("Go"))),
    );
    let source_api: Arc<dyn SourceApi> = Arc::clone(&source) as Arc<dyn SourceApi>;
    let budget = Arc::new(RateBudget::with_remaining(60, 0));

    let err = Aggregator::new(source_api, budget, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::RateLimitReached);
    assert_eq!(source.search_calls(), 0);
    assert_eq!(source.language_calls(), 0);
}

#[tokio::test]
async fn test_repository_without_language_hint_needs_no_lookup() {
    let source = Arc::new(
        FakeSource::default()
            .with_repository(repository(1, "docs", None))
            .with_repository(repository(2, "app", Some("Go")))
            .with_languages("app", &[("Go", 300), ("Shell", 12)]),
    );
    let aggregator = aggregator(&source, 60, 8);

    let records = aggregator
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap();

    assert!(records[0].languages().is_empty());
    assert_eq!(records[1].languages().len(), 2);
    assert_eq!(source.language_calls(), 1);
    // One token for the search, one for the single lookup.
    assert_eq!(aggregator.budget().available(), 58);
}

#[tokio::test]
async fn test_no_hints_means_no_lookups() {
    let source = Arc::new(
        FakeSource::default()
            .with_repository(repository(1, "a", None))
            .with_repository(repository(2, "b", None)),
    );

    // Only the search token is available.
    let records = aggregator(&source, 1, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.languages().is_empty()));
    assert_eq!(source.language_calls(), 0);
}

#[tokio::test]
async fn test_output_order_matches_search_order() {
    let names: Vec<String> = (0..10).map(|i| format!("repo{i}")).collect();
    let mut fake = FakeSource::default();
    for (i, name) in names.iter().enumerate() {
        // Earlier repositories answer last.
        fake = fake
            .with_repository(repository(i as u64 + 1, name, Some("Go")))
            .with_languages(name, &[("Go", i as u64)])
            .with_delay(name, 50 - i as u64 * 5);
    }
    let source = Arc::new(fake);

    let records = aggregator(&source, 60, 4)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap();

    let got: Vec<&str> = records.iter().map(|r| r.repository()).collect();
    assert_eq!(got, names.iter().map(String::as_str).collect::<Vec<_>>());
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.languages().get("Go"), Some(&(i as u64)));
    }
}

#[tokio::test]
async fn test_lookups_never_exceed_concurrency() {
    let mut fake = FakeSource::default();
    for i in 0..20 {
        fake = fake
            .with_repository(repository(i + 1, &format!("repo{i}"), Some("Go")))
            .with_delay(&format!("repo{i}"), 10);
    }
    let source = Arc::new(fake);

    aggregator(&source, 60, 3)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap();

    assert_eq!(source.language_calls(), 20);
    let peak = source.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in flight was {peak}");
}

#[tokio::test]
async fn test_failed_lookup_degrades_to_empty_histogram() {
    let source = Arc::new(
        FakeSource::default()
            .with_repository(repository(1, "flaky", Some("Go")))
            .with_repository(repository(2, "steady", Some("Go")))
            .with_languages("flaky", &[("Go", 1)])
            .with_languages("steady", &[("Go", 2)])
            .failing_for("flaky"),
    );

    let records = aggregator(&source, 60, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].languages().is_empty());
    assert_eq!(records[1].languages().get("Go"), Some(&2));
}

#[tokio::test]
async fn test_remote_rate_limit_on_search_is_reported() {
    let source = Arc::new(FakeSource {
        search_error: Some(|| SourceError::RateLimited { reset: None }),
        ..FakeSource::default()
    });

    let err = aggregator(&source, 60, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::RateLimitReached);
}

#[tokio::test]
async fn test_search_failure_is_fetch_error() {
    let source = Arc::new(FakeSource {
        search_error: Some(|| SourceError::Http {
            status: 500,
            message: "server error".to_string(),
        }),
        ..FakeSource::default()
    });

    let err = aggregator(&source, 60, 8)
        .latest_repositories(&SearchQuery::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::FetchError);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_budget() {
    let source = Arc::new(
        FakeSource::default().with_repository(repository(1, "repo1", Some("Go"))),
    );
    // Each request costs two tokens, so at most three of five can finish.
    let aggregator = Arc::new(aggregator(&source, 6, 8));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let aggregator = Arc::clone(&aggregator);
        handles.push(tokio::spawn(async move {
            aggregator.latest_repositories(&SearchQuery::new()).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert!((1..=3).contains(&succeeded), "{succeeded} requests succeeded");
    assert_eq!(source.language_calls(), succeeded);
    assert!(source.search_calls() + source.language_calls() <= 6);
}
