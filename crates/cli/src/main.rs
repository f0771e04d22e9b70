use analyst_core::domain::report::ReportData;
use analyst_core::stream::driver::drive_run;
use analyst_core::stream::run::{RunPhase, RunUpdate};
use analyst_core::stream::session::Session;
use analyst_core::transport::http::HttpAnalysisBackend;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "analyst_cli")]
struct Args {
    /// Stock ticker to analyze (trimmed and upper-cased).
    ticker: String,

    /// Print the parsed report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Analysis pipeline base URL. Overrides ANALYST_API_URL.
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = analyst_core::config::Settings::from_env()?.with_api_url(args.api_url.clone());
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let backend = HttpAnalysisBackend::from_settings(&settings)?;
    let mut session = Session::new();

    let run_id = drive_run(&backend, &mut session, &args.ticker, |update| match update {
        RunUpdate::StepAppended(step) => {
            tracing::info!(node = %step.node, label = %step.label, "{}", step.message)
        }
        RunUpdate::ReportReady => tracing::info!("report ready"),
        RunUpdate::Failed(message) => tracing::error!(error = %message, "analysis failed"),
    })
    .await?;

    let Some(run) = session.current() else {
        anyhow::bail!("run {run_id} vanished from session");
    };

    match (run.phase(), run.report()) {
        (RunPhase::Done, Some(report)) => {
            tracing::info!(
                %run_id,
                steps = run.completed_step_count(),
                "completed analysis steps"
            );
            print_report(report, args.json)?;
            Ok(())
        }
        (RunPhase::Error, _) => {
            let message = run.error().unwrap_or("analysis failed").to_string();
            let err = anyhow::anyhow!(message);
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
        (phase, _) => {
            tracing::warn!(%run_id, ?phase, "stream closed before a report was produced");
            anyhow::bail!("no report produced for {}", run.ticker())
        }
    }
}

fn print_report(report: &ReportData, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render::TextReport(report));
    }
    Ok(())
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
