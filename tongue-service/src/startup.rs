//! Application startup and lifecycle management.
//!
//! Wires configuration, the diagnosis provider, the login flag store and the
//! workbench into one HTTP router.

use crate::config::TongueConfig;
use crate::handlers::{diagnosis, health, image, metrics, report, session, workbench};
use crate::models::Workbench;
use crate::services::providers::gemini::GeminiDiagnosisClient;
use crate::services::{DiagnosisProvider, ImageAcquirer, SessionStore};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TongueConfig,
    pub acquirer: ImageAcquirer,
    pub provider: Arc<dyn DiagnosisProvider>,
    pub sessions: SessionStore,
    pub workbench: Arc<Mutex<Workbench>>,
}

impl AppState {
    /// Build state around a provider, restoring the persisted login flag.
    pub async fn new(config: TongueConfig, provider: Arc<dyn DiagnosisProvider>) -> Self {
        let sessions = SessionStore::new(config.session.file.clone());
        let logged_in = sessions.is_logged_in().await;

        Self {
            acquirer: ImageAcquirer::new(config.upload.max_image_bytes),
            provider,
            sessions,
            workbench: Arc::new(Mutex::new(Workbench::new(logged_in))),
            config,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.acquirer.max_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::metrics))
        .route(
            "/api/image",
            post(image::upload_image).delete(image::reset_image),
        )
        .route("/api/diagnosis", post(diagnosis::start_diagnosis))
        .route("/api/workbench", get(workbench::get_workbench))
        .route("/api/report", get(report::get_report))
        .route("/api/session/login", post(session::login))
        .route("/api/session/logout", post(session::logout))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(service_core::middleware::REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the Gemini provider from configuration.
    pub async fn build(config: TongueConfig) -> Result<Self, AppError> {
        let client = GeminiDiagnosisClient::new(config.gemini_config());

        if client.is_configured() {
            tracing::info!(model = %config.gemini.model, "Initialized Gemini diagnosis client");
        } else {
            tracing::warn!(
                model = %config.gemini.model,
                "GEMINI_API_KEY is not set; image upload works but diagnosis requests will fail"
            );
        }

        Self::build_with_provider(config, Arc::new(client)).await
    }

    /// Build the application around an explicit provider.
    pub async fn build_with_provider(
        config: TongueConfig,
        provider: Arc<dyn DiagnosisProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), provider).await;

        // Port 0 = random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Tongue service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
