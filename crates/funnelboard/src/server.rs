use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use funnelboard_core::config::DashboardConfig;
use funnelboard_core::dashboard::{refresh, DashboardSnapshot};
use funnelboard_core::error::DashboardError;
use funnelboard_core::fetch::SheetSource;
use funnelboard_core::periods::PeriodSelection;

use crate::views;

/// Read-only per-process state. Every request runs its own refresh cycle.
#[derive(Clone)]
pub struct AppState {
    config: Arc<DashboardConfig>,
    source: Arc<dyn SheetSource>,
}

impl AppState {
    pub fn new(config: DashboardConfig, source: Arc<dyn SheetSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    async fn run_cycle(&self, query: &PeriodQuery) -> Result<DashboardSnapshot, DashboardError> {
        let selection = query.selection();
        refresh(self.source.as_ref(), &self.config.cycle_options(), selection).await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    /// Malformed values fall back to every period, like months without data do.
    fn selection(&self) -> PeriodSelection {
        PeriodSelection::from_query(self.period.as_deref()).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring period parameter");
            PeriodSelection::All
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Html<String> {
    let refresh_secs = state.config.refresh_interval_secs;
    let page = match state.run_cycle(&query).await {
        Ok(snapshot) => views::dashboard_page(&snapshot, refresh_secs),
        Err(err) => {
            error!(error = %err, "refresh cycle failed");
            views::error_page(&err.to_string(), refresh_secs)
        }
    };
    Html(page.into_string())
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    match state.run_cycle(&query).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => {
            error!(error = %err, "refresh cycle failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

pub async fn serve(config: DashboardConfig, source: Arc<dyn SheetSource>) -> Result<()> {
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        addr = %listener.local_addr()?,
        source = %source.describe(),
        refresh_secs = config.refresh_interval_secs,
        "dashboard listening"
    );

    let app = router(AppState::new(config, source));
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
