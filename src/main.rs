use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod chart;
mod config;
mod csat;
mod dashboard;
mod error;
mod filter;
mod loader;
mod models;
mod report;
mod server;
mod session;

use config::DashboardConfig;
use filter::TimeRange;
use session::Session;

#[derive(Parser)]
#[command(name = "csat-dashboard")]
#[command(about = "Customer satisfaction metrics from survey CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the browser dashboard
    Serve {
        #[command(flatten)]
        config: DashboardConfig,
        /// Preload a session from this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print CSAT per entity
    Summary {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = TimeRange::AllTime)]
        range: TimeRange,
    },
    /// Print day-by-day CSAT for one entity
    Daily {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Write the day-by-day chart for one entity as SVG
    Chart {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value = "chart.svg")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = TimeRange::AllTime)]
        range: TimeRange,
        #[arg(long)]
        entity: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(csv: &Path) -> anyhow::Result<models::Dataset> {
    loader::load_path(csv).with_context(|| format!("failed to load {}", csv.display()))
}

fn resolve_dates(
    dataset: &models::Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let span = dataset.date_span();
    Some((
        start.or(span.map(|(min, _)| min))?,
        end.or(span.map(|(_, max)| max))?,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Serve { config, csv } => {
            let session = match csv {
                Some(path) => {
                    let dataset = load(&path)?;
                    let session = Session::new(path.display().to_string(), dataset);
                    info!(
                        session = %session.id,
                        records = session.dataset.len(),
                        "preloaded session"
                    );
                    Some(session)
                }
                None => None,
            };
            server::serve(server::AppState::new(config, session)).await?;
        }
        Commands::Summary { csv, range } => {
            let dataset = load(&csv)?;
            let now = Local::now().naive_local();
            let recent = filter::filter_by_time_range(&dataset.records, range, now);
            let summary = csat::csat_by_entity(&recent)?;

            if summary.is_empty() {
                println!("No submissions found for {range}.");
                return Ok(());
            }

            println!("CSAT Breakdown by Entity ({range}):");
            print!("{}", report::summary_table(&summary));
        }
        Commands::Daily {
            csv,
            entity,
            start,
            end,
        } => {
            let dataset = load(&csv)?;
            let Some((start, end)) = resolve_dates(&dataset, start, end) else {
                println!("{}", report::NO_DAILY_DATA);
                return Ok(());
            };
            let daily = session::daily_for_dates(&dataset, &entity, start, end)?;

            println!("CSAT Day-by-Day for Entity: {entity} ({start} to {end})");
            print!("{}", report::daily_table(&daily));
        }
        Commands::Chart {
            csv,
            entity,
            start,
            end,
            out,
        } => {
            let dataset = load(&csv)?;
            let daily = match resolve_dates(&dataset, start, end) {
                Some((start, end)) => session::daily_for_dates(&dataset, &entity, start, end)?,
                None => models::DailyCsat {
                    entity: entity.clone(),
                    points: Vec::new(),
                },
            };

            if daily.is_empty() {
                println!("{}", report::NO_DAILY_DATA);
                return Ok(());
            }

            std::fs::write(&out, chart::render_daily_chart(&daily))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Chart written to {}.", out.display());
        }
        Commands::Report {
            csv,
            range,
            entity,
            out,
        } => {
            let dataset = load(&csv)?;
            let report = report::build_report(
                &csv.display().to_string(),
                &dataset,
                range,
                entity.as_deref(),
                Local::now().naive_local(),
            )?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
