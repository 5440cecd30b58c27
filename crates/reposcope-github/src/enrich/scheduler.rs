//! Bounded fan-out of language lookups over a batch of records.
//!
//! Dispatch acquires a concurrency slot before spawning each worker, so at
//! most `concurrency` lookups are in flight. Workers send their result on a
//! channel sized to the batch; the dispatch path joins every worker before
//! the channel closes, and a single collector merges results back by
//! repository id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use reposcope_core::model::{LanguageHistogram, LanguageResult, RepositoryId, RepositoryRecord};

use crate::enrich::fetcher::{LanguageFetcher, LanguageTarget};

/// Concurrency ceiling when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Attaches language histograms to a batch of records.
#[derive(Debug, Clone)]
pub struct EnrichScheduler {
    fetcher: LanguageFetcher,
    concurrency: usize,
}

impl EnrichScheduler {
    /// A scheduler running at most `concurrency` lookups at once.
    ///
    /// A ceiling of zero is raised to one.
    pub fn new(fetcher: LanguageFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enrich every record and return the batch in its original order.
    ///
    /// Records without a primary-language hint get an empty histogram and
    /// no outbound call. A failed lookup is logged and leaves that record
    /// with an empty histogram; it never fails the batch.
    pub async fn enrich(&self, records: Vec<RepositoryRecord>) -> Vec<RepositoryRecord> {
        if records.is_empty() {
            return records;
        }

        let (tx, mut rx) = mpsc::channel::<LanguageResult>(records.len());
        let slots = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();

        for record in &records {
            if !record.needs_language_lookup() {
                // Capacity equals the batch size, so this never waits.
                if tx.send(LanguageResult::empty(record.id())).await.is_err() {
                    log::error!("Collector closed before dispatch finished");
                }
                continue;
            }

            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                log::error!("Enrichment slots closed; stopping dispatch");
                break;
            };

            let target = LanguageTarget::from(record);
            let fetcher = self.fetcher.clone();
            let tx = tx.clone();

            workers.spawn(async move {
                let _permit = permit;
                match fetcher.fetch(&target).await {
                    Ok(result) => {
                        if tx.send(result).await.is_err() {
                            log::error!(
                                "Collector closed before result for {}/{} was sent",
                                target.owner,
                                target.repository
                            );
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "Language lookup for {}/{} failed ({}): {}",
                            target.owner,
                            target.repository,
                            e.code(),
                            e
                        );
                    }
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                log::error!("Enrichment worker did not complete: {}", e);
            }
        }

        // Every worker has finished; dropping the last sender closes the
        // channel so the drain below terminates.
        drop(tx);

        let mut languages: HashMap<RepositoryId, LanguageHistogram> =
            HashMap::with_capacity(records.len());
        while let Some(result) = rx.recv().await {
            languages.insert(result.repository_id, result.languages);
        }

        // Records sharing an id share one histogram.
        records
            .into_iter()
            .map(|record| {
                let histogram = languages.get(&record.id()).cloned().unwrap_or_default();
                record.with_languages(histogram)
            })
            .collect()
    }
}
