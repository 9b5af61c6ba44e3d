//! API module providing the HTTP endpoints of the alert tracker.
//!
//! This module is organized into submodules:
//! - `ingest` - Monitoring-source alert submission (/receive)
//! - `alerts` - Analyst triage and customer alert listings (/alerts/*)
//! - `non_malicious` - Customer self-remediation (/alerts/non-malicious/*)
//! - `endpoints` - Endpoint inventory (/endpoints/*)
//! - `dashboard` - Aggregated statistics (/dashboard/*)
//! - `report` - PDF report download (/pdf-report)
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod alerts;
pub mod dashboard;
pub mod endpoints;
pub mod health;
pub mod ingest;
pub mod non_malicious;
pub mod openapi;
pub mod report;

pub use alerts::ALERTS_TAG;
pub use dashboard::DASHBOARD_TAG;
pub use endpoints::ENDPOINTS_TAG;
pub use health::MISC_TAG;
pub use ingest::INGEST_TAG;
pub use non_malicious::SELF_SERVICE_TAG;
pub use report::REPORTS_TAG;

use crate::AppResources;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Builds the full application router, including the Redoc UI. Split out
/// of [`start_webserver`] so tests can drive the router in-process.
pub fn build_router(resources: AppResources) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .routes(routes!(ingest::receive_alert))
        .nest(
            "/alerts",
            alerts::router().merge(non_malicious::router()),
        )
        .nest("/endpoints", endpoints::router())
        .nest("/dashboard", dashboard::router())
        .routes(routes!(report::pdf_report))
        .routes(routes!(health::health))
        .layer(axum::Extension(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(resources))]
pub async fn start_webserver(resources: AppResources) -> color_eyre::Result<()> {
    let listen_addr = resources.config.listen_addr.clone();
    let router = build_router(resources);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(
        name = "server.started",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        addr = %listen_addr,
        message = "Server running"
    );
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
