use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::chart;
use crate::config::DashboardConfig;
use crate::csat;
use crate::dashboard;
use crate::error::{CsatError, LoadError};
use crate::filter::{self, TimeRange};
use crate::loader;
use crate::models::{DailyCsat, EntityCsat};
use crate::session::{self, DashboardView, Session, SessionConfig};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No CSV file has been uploaded yet")]
    NoSession,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid CSV: {0}")]
    Load(#[from] LoadError),
    #[error("Upload failed: {0}")]
    Upload(#[from] MultipartError),
    #[error("Aggregation failed: {0}")]
    Csat(#[from] CsatError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NoSession => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::Load(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(err) => err.status(),
            AppError::Csat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub struct AppState {
    pub config: DashboardConfig,
    pub session: RwLock<Option<Session>>,
}

impl AppState {
    pub fn new(config: DashboardConfig, session: Option<Session>) -> Arc<Self> {
        Arc::new(Self {
            config,
            session: RwLock::new(session),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub range: TimeRange,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub entity: String,
    #[serde(default, deserialize_with = "session::empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "session::empty_as_none")]
    pub end: Option<NaiveDate>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/api/summary", get(api_summary))
        .route("/api/daily", get(api_daily))
        .route("/chart.svg", get(chart_svg))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind = state.config.bind;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, "CSAT dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(config): Query<SessionConfig>,
) -> Result<Html<String>, AppError> {
    let guard = state.session.read().await;
    let Some(session) = guard.as_ref() else {
        return Ok(Html(dashboard::render_upload_page()));
    };

    let view = DashboardView::build(&session.dataset, &config, now())?;
    Ok(Html(dashboard::render_dashboard(session, &view)))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let source_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field.bytes().await?;

        let dataset = loader::load_reader(bytes.as_ref()).inspect_err(|err| {
            warn!(file = %source_name, error = %err, "rejected CSV upload");
        })?;
        if dataset.is_empty() {
            warn!(file = %source_name, "uploaded CSV has no submissions");
        }
        let session = Session::new(source_name, dataset);
        info!(
            session = %session.id,
            file = %session.source_name,
            records = session.dataset.len(),
            entities = session.dataset.entities().len(),
            "new session from upload"
        );
        *state.session.write().await = Some(session);
        return Ok(Redirect::to("/"));
    }

    Err(AppError::InvalidInput("multipart field 'file' is required".to_string()))
}

async fn api_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<EntityCsat>>, AppError> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or(AppError::NoSession)?;
    let recent = filter::filter_by_time_range(&session.dataset.records, query.range, now());
    Ok(Json(csat::csat_by_entity(&recent)?))
}

async fn api_daily(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyCsat>, AppError> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or(AppError::NoSession)?;
    Ok(Json(daily_for_query(session, &query)?))
}

async fn chart_svg(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Response, AppError> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or(AppError::NoSession)?;
    let daily = daily_for_query(session, &query)?;
    if daily.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "no submissions for '{}' in the selected date range",
            query.entity
        )));
    }

    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        chart::render_daily_chart(&daily),
    )
        .into_response())
}

fn daily_for_query(session: &Session, query: &DailyQuery) -> Result<DailyCsat, AppError> {
    let span = session.dataset.date_span();
    let (Some(start), Some(end)) = (
        query.start.or(span.map(|(min, _)| min)),
        query.end.or(span.map(|(_, max)| max)),
    ) else {
        return Ok(DailyCsat {
            entity: query.entity.clone(),
            points: Vec::new(),
        });
    };
    Ok(session::daily_for_dates(&session.dataset, &query.entity, start, end)?)
}
