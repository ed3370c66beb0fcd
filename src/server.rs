use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::dashboard;
use crate::pipeline;

/// Everything served is computed once before the listener starts.
#[derive(Debug)]
pub struct DashboardState {
    pub page: String,
    pub summary: Value,
}

pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/summary", get(summary))
        .with_state(state)
}

pub async fn run(csv: &Path, addr: SocketAddr, config: &AnalysisConfig) -> anyhow::Result<()> {
    let (table, analyses) = pipeline::prepare(csv, config)?;
    let state = DashboardState {
        page: dashboard::render_page(&table, &analyses, config),
        summary: serde_json::to_value(&analyses).context("failed to serialize analyses")?,
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Dashboard available at http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state)))
        .await
        .context("server error")?;
    Ok(())
}

async fn index(State(state): State<Arc<DashboardState>>) -> Html<String> {
    debug!("GET /");
    Html(state.page.clone())
}

async fn health_check() -> Json<Value> {
    debug!("GET /health");
    Json(json!({"status": "ok"}))
}

async fn summary(State(state): State<Arc<DashboardState>>) -> Json<Value> {
    debug!("GET /api/summary");
    Json(state.summary.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<DashboardState> {
        Arc::new(DashboardState {
            page: "<html></html>".to_string(),
            summary: json!({"geography": []}),
        })
    }

    #[tokio::test]
    async fn index_serves_rendered_page() {
        let Html(body) = index(State(state())).await;
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn summary_returns_precomputed_json() {
        let Json(body) = summary(State(state())).await;
        assert_eq!(body, json!({"geography": []}));
    }
}
