use super::{call, AppState, Health, Procedure, Success};
use crate::error::{Error, RpcError};
use crate::log::RPC;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
struct RpcQuery {
    input: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/rpc/{procedure}", get(query).post(mutation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn healthcheck() -> Json<Health> {
    Json(Health::ok())
}

/// An empty body means the procedure takes no input
async fn mutation(
    State(state): State<Arc<AppState>>,
    Path(procedure): Path<String>,
    body: Bytes,
) -> Result<Success, Error> {
    let input = if body.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&body).map_err(Error::from)
    };

    call(&state, &procedure, input).await.map(Success::new)
}

/// Only query procedures are served over GET
async fn query(
    State(state): State<Arc<AppState>>,
    Path(procedure): Path<String>,
    Query(query): Query<RpcQuery>,
) -> Result<Success, Error> {
    if let Ok(known) = procedure.parse::<Procedure>() {
        if !known.is_query() {
            warn!(target: RPC, msg = "Mutation called over GET", procedure = known.name());
            return Err(RpcError::MethodNotSupported { name: procedure }.into());
        }
    }

    let input = match query.input {
        Some(input) => serde_json::from_str(&input).map_err(Error::from),
        None => Ok(Value::Null),
    };

    call(&state, &procedure, input).await.map(Success::new)
}

///
/// Serves until SIGINT or SIGTERM.
///
/// In-flight requests get `shutdown_timeout` to finish before the remaining
/// connections are dropped.
///
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown_timeout: Duration,
) -> Result<(), Error> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server = axum::serve(listener, router(state)).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let deadline = async move {
        if shutdown_rx.wait_for(|shutdown| *shutdown).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server.into_future() => result?,
        _ = deadline => {
            warn!(msg = "Shutdown timeout elapsed, dropping open connections");
        }
    }

    info!(msg = "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        result = sigint() => match result {
            Ok(_) => info!(msg = "Received SIGINT"),
            Err(err) => error!(msg = "Could not listen for SIGINT", error = err.to_string()),
        },
        result = sigterm() => match result {
            Ok(_) => info!(msg = "Received SIGTERM"),
            Err(err) => error!(msg = "Could not listen for SIGTERM", error = err.to_string()),
        },
    }
}

async fn sigint() -> std::io::Result<()> {
    signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}

async fn sigterm() -> std::io::Result<()> {
    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}
