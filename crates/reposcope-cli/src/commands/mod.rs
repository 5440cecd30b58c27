pub mod config;
pub mod fetch;
pub mod serve;
pub mod status;

pub use fetch::run_fetch;
pub use serve::run_serve;
pub use status::show_status;

use std::sync::Arc;

use anyhow::{Context, Result};
use reposcope_github::{Aggregator, Config, GithubClient, RateBudget, RateSnapshot, SourceApi};

/// Build the GitHub client described by `config`.
fn client(config: &Config) -> Result<GithubClient> {
    let token = config.github_token().map(str::to_string);
    let client = GithubClient::with_base_url(&config.github_api_url, token)
        .context("Failed to create GitHub client")?;
    if !client.is_authenticated() {
        log::warn!("No GitHub token configured; the API allows 60 calls per hour");
    }
    Ok(client)
}

/// Read the remote quota and build an aggregator whose budget starts from it.
async fn aggregator(config: &Config) -> Result<(Aggregator, RateSnapshot)> {
    let source: Arc<dyn SourceApi> = Arc::new(client(config)?);

    let snapshot = source
        .rate_limit()
        .await
        .context("Failed to read the GitHub rate limit")?;
    log::info!(
        "Rate budget seeded: {}/{} calls remaining, window resets at {}",
        snapshot.remaining,
        snapshot.limit,
        snapshot
            .reset
            .map_or_else(|| "unknown".to_string(), |at| at.to_rfc3339())
    );

    let budget = Arc::new(RateBudget::from_snapshot(&snapshot));
    Ok((
        Aggregator::new(source, budget, config.max_parallel_tasks()),
        snapshot,
    ))
}
