#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use handlebars::Handlebars;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::DashboardConfig;
use crate::downloader;
use crate::error::{DashboardError, LoadError};
use crate::loader;
use crate::page::{self, ChartKind};
use crate::view::{Dashboard, ViewQuery};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub struct AppState {
    dashboard: Dashboard,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Result<Self, DashboardError> {
        Ok(Self {
            dashboard,
            templates: page::templates()?,
        })
    }
}

/// Loads the source file, then serves the dashboard until the process exits.
///
/// Load and schema failures are returned before the listener is bound.
pub async fn run(config: DashboardConfig) -> Result<(), DashboardError> {
    let table = loader::load_table(&config.data_path)?;
    let dashboard = Dashboard::new(Arc::new(table), &config).map_err(LoadError::from)?;
    log::info!(
        "{} retailers, invoices from {} to {}",
        dashboard.retailers().len(),
        dashboard.bounds().0,
        dashboard.bounds().1
    );

    let app_state = Arc::new(AppState::new(dashboard)?);
    let app = router(app_state);

    let listener = TcpListener::bind(config.addr).await?;
    log::info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/charts/:chart", get(serve_chart))
        .route("/api/summary", get(get_summary))
        .route("/export/csv", get(export_csv))
        .route("/export/xlsx", get(export_xlsx))
        .with_state(state)
}

async fn serve_dashboard(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let selection = state.dashboard.resolve(&query);
    let snapshot = state.dashboard.snapshot(&selection);

    match page::render_page(&state.templates, &state.dashboard, &snapshot) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("dashboard page failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn serve_chart(
    Path(chart): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(kind) = ChartKind::from_name(&chart) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let selection = state.dashboard.resolve(&query);
    let snapshot = state.dashboard.snapshot(&selection);

    match kind.render(&snapshot, state.dashboard.chart_size()) {
        Ok(Some(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            log::error!("{} chart failed: {}", kind.name(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_summary(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let selection = state.dashboard.resolve(&query);
    let snapshot = state.dashboard.snapshot(&selection);

    Json(snapshot.summary()).into_response()
}

async fn export_csv(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let selection = state.dashboard.resolve(&query);
    let snapshot = state.dashboard.snapshot(&selection);

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales-export.csv\"",
            ),
        ],
        downloader::to_csv(&snapshot.subset),
    )
        .into_response()
}

async fn export_xlsx(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let selection = state.dashboard.resolve(&query);
    let snapshot = state.dashboard.snapshot(&selection);

    match downloader::to_xlsx(&snapshot.subset) {
        Ok(buffer) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sales-export.xlsx\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(e) => {
            log::error!("xlsx export failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
