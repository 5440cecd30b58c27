use anyhow::{Context, Result};
use reposcope_github::{Config, SourceApi};

/// Print the remote rate-limit snapshot.
pub async fn show_status(config: &Config) -> Result<()> {
    let client = super::client(config)?;
    let snapshot = client
        .rate_limit()
        .await
        .context("Failed to read the GitHub rate limit")?;

    println!("\n📊 reposcope status\n");
    println!("  API: {}", config.github_api_url);
    println!(
        "  Authenticated: {}",
        if client.is_authenticated() { "yes" } else { "no" }
    );
    println!("  Limit: {} calls/hour", snapshot.limit);
    println!("  Used: {}", snapshot.used());
    println!("  Remaining: {}", snapshot.remaining);
    match snapshot.reset {
        Some(reset) => println!("  Resets at: {}", reset.to_rfc3339()),
        None => println!("  Resets at: unknown"),
    }

    if snapshot.remaining == 0 {
        println!("\n  Quota exhausted; requests will be refused until the reset");
    } else if !client.is_authenticated() {
        println!("\n  Set REPOSCOPE_GITHUB_TOKEN to raise the limit to 5000 calls/hour");
    }

    Ok(())
}
