//! ServiceMedic -- deterministic incident triage for service telemetry.
//!
//! This crate provides the decision logic behind an operations dashboard's
//! "what is currently wrong with this service" signal: a typed feature
//! snapshot, a first-match-wins rule cascade classifying it into incident
//! categories with severity, confidence, and human-readable evidence, plus a
//! synthetic telemetry generator for demos and test fixtures. A thin HTTP
//! API exposes the engine to dashboards.

pub mod api;
pub mod config;
pub mod detect;
pub mod synth;

use anyhow::Result;

/// Start the ServiceMedic daemon: the triage API server.
pub async fn serve(config: config::MedicConfig) -> Result<()> {
    let state = api::state::AppState::new();
    let app = api::router(state);

    let addr: std::net::SocketAddr = config.server.bind.parse()?;
    tracing::info!(%addr, "ServiceMedic listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
