use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use reposcope_github::Config;
use tokio::net::TcpListener;

use crate::server;

/// Seed the budget, bind `0.0.0.0:<listen_port>` and serve until signalled.
pub async fn run_serve(config: &Config) -> Result<()> {
    let (aggregator, _) = super::aggregator(config).await?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, Arc::new(aggregator)).await
}
