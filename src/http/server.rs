//! HTTP trigger surface.
//!
//! # Responsibilities
//! - Create Axum Router with the asset handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until Ctrl+C, then drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::assets::{pretty_json, Asset, AssetService};
use crate::config::HttpConfig;
use crate::http::response::ApiError;
use crate::net::channel::{Connector, TlsConnector};

type SharedService<C> = Arc<AssetService<C>>;

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn router<C>(service: SharedService<C>, config: &HttpConfig) -> Router
where
    C: Connector + 'static,
{
    Router::new()
        .route("/test/init", get(init_ledger::<C>))
        .route("/test/get", get(get_all_assets::<C>))
        .route("/test/assets", post(create_asset::<C>))
        .with_state(service)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// HTTP server triggering asset operations.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(service: AssetService<TlsConnector>, config: &HttpConfig) -> Self {
        Self {
            router: router(Arc::new(service), config),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn init_ledger<C: Connector>(
    State(service): State<SharedService<C>>,
) -> Result<StatusCode, ApiError> {
    service.init_ledger().await?;
    tracing::info!("Ledger initialized");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_all_assets<C: Connector>(
    State(service): State<SharedService<C>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = service.get_all_assets().await?;
    let body = pretty_json(&payload)?;
    tracing::info!(bytes = payload.len(), "Assets read");
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

async fn create_asset<C: Connector>(
    State(service): State<SharedService<C>>,
    Json(asset): Json<Asset>,
) -> Result<impl IntoResponse, ApiError> {
    service.create_asset(&asset).await?;
    tracing::info!(asset_id = %asset.id, "Asset created");
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
