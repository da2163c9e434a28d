use crate::config::ConverterConfig;
use crate::handlers;
use crate::services::{FileLocks, LocalStorage, Storage};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use service_core::shutdown::shutdown_signal;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ConverterConfig,
    pub uploads: Arc<dyn Storage>,
    pub outputs: Arc<dyn Storage>,
    pub locks: FileLocks,
}

impl AppState {
    /// Open (and create if needed) the upload and output directories.
    pub async fn new(config: ConverterConfig) -> Result<Self, AppError> {
        let uploads = open_storage(&config.storage.upload_dir).await?;
        let outputs = open_storage(&config.storage.output_dir).await?;

        Ok(Self {
            config,
            uploads,
            outputs,
            locks: FileLocks::new(),
        })
    }
}

async fn open_storage(path: &str) -> Result<Arc<dyn Storage>, AppError> {
    let storage = LocalStorage::new(path).await.map_err(|e| {
        tracing::error!("Failed to initialize local storage at {}: {}", path, e);
        e
    })?;
    Ok(Arc::new(storage))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/convert", post(handlers::convert_to_pdf))
        .route("/api/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(DefaultBodyLimit::disable())
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: ConverterConfig) -> Result<Self, AppError> {
        let state = AppState::new(config.clone()).await?;
        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
