//! ExpenseGuard Web Server
//!
//! Axum-based REST API over the ExpenseGuard transaction pipeline.
//!
//! - `GET /`: liveness text
//! - `POST /upload_csv`: multipart CSV upload, fraud scoring and categorization
//! - `POST /forecast`: JSON records in, daily spending forecast out
//!
//! Models are loaded once before the router is built and shared read-only.
//! Pipeline work runs on the blocking pool; uploads are size-capped and
//! forecasts are time-bounded.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use expenseguard_core::{ErrorKind, Pipeline, ServerLimits};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub pipeline: Pipeline,
    pub limits: ServerLimits,
}

/// Create the application router
pub fn create_router(
    pipeline: Pipeline,
    limits: ServerLimits,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    if !pipeline.models().fraud_ready() {
        warn!("⚠️  Fraud model not loaded - /upload_csv will return errors");
    }

    let body_limit = limits.max_upload_bytes;
    let state = Arc::new(AppState { pipeline, limits });

    let cors = {
        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
        if config.allowed_origins.is_empty() {
            base
        } else {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            base.allow_origin(origins)
        }
    };

    let mut app = Router::new()
        .route("/", get(handlers::home))
        .route("/upload_csv", post(handlers::upload_csv))
        .route("/forecast", post(handlers::forecast))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    // Serve the browser UI if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    pipeline: Pipeline,
    limits: ServerLimits,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(pipeline, limits, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    pipeline: Pipeline,
    limits: ServerLimits,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        match_mode = %pipeline.categorizer().mode(),
        fraud_ready = pipeline.models().fraud_ready(),
        max_upload_bytes = limits.max_upload_bytes,
        forecast_timeout_secs = limits.forecast_timeout.as_secs(),
        "Pipeline ready"
    );

    let app = create_router(pipeline, limits, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<expenseguard_core::Error> for AppError {
    fn from(err: expenseguard_core::Error) -> Self {
        use expenseguard_core::Error as CoreError;

        match err.kind() {
            ErrorKind::Rejected => Self::bad_request(&err.to_string()),
            ErrorKind::Processing => match err {
                CoreError::ModelUnavailable(ref msg) => {
                    error!(error = %err, "Model unavailable");
                    Self::internal(msg)
                }
                CoreError::FeatureShapeMismatch { .. } | CoreError::Forecast(_) => {
                    error!(error = %err, "Pipeline failure");
                    Self::internal(&format!("Error processing file: {}", err))
                }
                other => Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    // Return generic message to client
                    message: "An internal error occurred".to_string(),
                    // Keep full error for logging
                    internal: Some(other.into()),
                },
            },
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}
