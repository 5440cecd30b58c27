use anyhow::{Context, Result};
use reposcope_core::model::SearchQuery;
use reposcope_github::Config;

/// Run one latest-repositories query and print the result as JSON.
pub async fn run_fetch(config: &Config, query: SearchQuery) -> Result<()> {
    let (aggregator, _) = super::aggregator(config).await?;

    let records = aggregator
        .latest_repositories(&query)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code(), e))?;

    let json = serde_json::to_string_pretty(&records).context("Failed to serialize result")?;
    println!("{json}");

    log::info!("{} repositories fetched", records.len());
    Ok(())
}
