use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyst_core::domain::persona::{CompanyProfile, PersonaAnalysisData};
use analyst_core::domain::report::ReportData;
use analyst_core::stream::driver::drive_run;
use analyst_core::stream::run::{RunPhase, RunSnapshot};
use analyst_core::stream::session::Session;
use analyst_core::transport::http::HttpAnalysisBackend;
use analyst_core::transport::AnalysisBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = analyst_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let backend = HttpAnalysisBackend::from_settings(&settings)?;
    tracing::info!(upstream = %backend.url(), "analysis pipeline configured");

    let state = AppState {
        backend: Arc::new(backend),
    };
    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/reports", post(run_report))
        .route("/reports/parse", post(parse_report))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    backend: Arc<dyn AnalysisBackend>,
}

#[derive(Debug, Deserialize)]
struct ParseRequest {
    ticker: String,
    #[serde(default)]
    report: String,
    #[serde(default)]
    financial_info: String,
    #[serde(default)]
    persona_analyses: Vec<PersonaAnalysisData>,
    #[serde(default)]
    company_profile: Option<CompanyProfile>,
}

/// Parses already-accumulated fields without touching the pipeline.
async fn parse_report(Json(req): Json<ParseRequest>) -> Json<ReportData> {
    let profile = req.company_profile.filter(|p| !p.is_empty());
    Json(analyst_core::report::parse_report(
        &req.ticker,
        &req.report,
        &req.financial_info,
        &req.persona_analyses,
        profile.as_ref(),
    ))
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    ticker: String,
}

/// Drives one analysis stream to its end and returns the final run state.
/// An upstream failure keeps the same body shape with a 502 status.
async fn run_report(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<(StatusCode, Json<RunSnapshot>), StatusCode> {
    let mut session = Session::new();
    let run_id = drive_run(state.backend.as_ref(), &mut session, &req.ticker, |_| {})
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected analysis request");
            StatusCode::BAD_REQUEST
        })?;

    let snapshot = session
        .current()
        .map(|run| run.snapshot())
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let status = match snapshot.phase {
        RunPhase::Done => StatusCode::OK,
        _ => {
            let err = anyhow::anyhow!(
                "analysis run {run_id} for {} ended in phase {:?}: {}",
                snapshot.ticker,
                snapshot.phase,
                snapshot.error.as_deref().unwrap_or("no report produced")
            );
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "analysis run did not complete");
            StatusCode::BAD_GATEWAY
        }
    };

    Ok((status, Json(snapshot)))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &analyst_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
