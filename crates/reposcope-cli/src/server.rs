//! HTTP boundary.
//!
//! `GET /repos?owner=&license=&language=` answers with the enriched list,
//! or with `{code, message}` and 429 (rate limited) or 500 (anything else).
//! Any origin may call it with `GET`.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use reposcope_core::model::SearchQuery;
use reposcope_core::{ApiError, ErrorCode};
use reposcope_github::Aggregator;

pub const REPOS_PATH: &str = "/repos";

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// How long browsers may cache a preflight answer.
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route(REPOS_PATH, get(latest_repositories))
        .with_state(aggregator)
        .layer(cors())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::HOST,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(CORS_MAX_AGE)
}

async fn latest_repositories(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let request_id = Uuid::new_v4();
    log::info!("[{}] GET {} q=\"{}\"", request_id, REPOS_PATH, query.to_query());

    // Runs to completion even if the client disconnects.
    let outcome =
        tokio::spawn(async move { aggregator.latest_repositories(&query).await }).await;

    match outcome {
        Ok(Ok(records)) => {
            log::info!("[{}] 200, {} repositories", request_id, records.len());
            Json(records).into_response()
        }
        Ok(Err(e)) => {
            let code = e.code();
            log::error!("[{}] {}: {}", request_id, code, e);
            error_response(code)
        }
        Err(e) => {
            log::error!("[{}] request task failed: {}", request_id, e);
            error_response(ErrorCode::FetchError)
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    if code.is_rate_limit() {
        StatusCode::TOO_MANY_REQUESTS
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(code: ErrorCode) -> Response {
    (status_for(code), Json(ApiError::from(code))).into_response()
}

/// How a server run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Every in-flight request finished within the grace period.
    Graceful,
    /// The grace period ran out and remaining requests were abandoned.
    Forced,
}

/// Serve `aggregator` on `listener` until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, aggregator: Arc<Aggregator>) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    log::info!("Listening on http://{}{}", addr, REPOS_PATH);

    match serve_until(listener, router(aggregator), shutdown_signal(), SHUTDOWN_TIMEOUT).await? {
        Shutdown::Graceful => log::info!("Server stopped gracefully"),
        Shutdown::Forced => log::error!(
            "Server forced to shutdown after {}s with requests in flight",
            SHUTDOWN_TIMEOUT.as_secs()
        ),
    }
    Ok(())
}

/// Serve `router` until `signal` resolves, then give in-flight requests at
/// most `grace` to complete.
pub async fn serve_until<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    grace: Duration,
) -> Result<Shutdown>
where
    F: Future<Output = ()> + Send + 'static,
{
    let started = Arc::new(Notify::new());
    let trigger = Arc::clone(&started);

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            trigger.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        finished = &mut server => {
            finished.context("HTTP server failed")?;
            return Ok(Shutdown::Graceful);
        }
        () = started.notified() => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(finished) => {
            finished.context("HTTP server failed")?;
            Ok(Shutdown::Graceful)
        }
        Err(_) => Ok(Shutdown::Forced),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => log::info!("Received SIGINT, shutting down"),
        () = terminate => log::info!("Received SIGTERM, shutting down"),
    }
}
