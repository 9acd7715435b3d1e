//! Gizi dashboard CLI
//!
//! Serves the dashboard, or runs a single prediction or the report from the
//! command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gizi_core::report::build_report;
use gizi_core::{predictor, AppContext, FeatureRecord, Sex};
use gizi_dashboard::{build_router, AppState, DashboardConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gizi-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Child nutritional status classifier dashboard", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8501
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Serialized classifier (JSON tree ensemble)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Label encoder tables (JSON)
    #[arg(long, global = true)]
    label_encoders: Option<PathBuf>,

    /// Reference dataset (CSV)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web dashboard (default)
    Serve,

    /// Predict the status of one child
    Predict {
        /// Age in months (0-60)
        #[arg(long)]
        umur: u32,

        /// Laki-laki or Perempuan
        #[arg(long)]
        jenis_kelamin: Sex,

        /// Height in cm (30.0-150.0)
        #[arg(long)]
        tinggi_badan: f64,
    },

    /// Print the data and model report
    Report {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(bind) = &cli.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(label_encoders) = &cli.label_encoders {
        config.label_encoders_path = label_encoders.clone();
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset_path = dataset.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = resolve_config(&cli)?;
    let ctx = AppContext::load(&config.artifacts()).context("Failed to load model artifacts")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(ctx, &config).await,
        Command::Predict {
            umur,
            jenis_kelamin,
            tinggi_badan,
        } => {
            let record = FeatureRecord::new(umur, jenis_kelamin, tinggi_badan)?;
            let prediction = predictor::run(&ctx, &record)?;
            println!("Prediksi Status Gizi: {}", prediction.label);
            println!("{}", prediction.explanation);
            Ok(())
        }
        Command::Report { json } => {
            let report = build_report(&ctx, config.report_options())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let e = &report.evaluation;
                println!("Rows: {}", report.descriptive.row_count);
                for share in &report.descriptive.status_distribution {
                    println!("  {:<18} {:>4} ({:.2}%)", share.label, share.count, share.percentage);
                }
                println!("Accuracy: {:.4}", e.accuracy);
                for class in &e.classification.classes {
                    println!(
                        "  {:<18} precision {:.2} recall {:.2} f1 {:.2} support {}",
                        class.label, class.precision, class.recall, class.f1, class.support
                    );
                }
                for curve in &e.roc_curves {
                    match curve.auc {
                        Some(auc) => println!("  ROC {:<14} AUC {:.3}", curve.label, auc),
                        None => println!("  ROC {:<14} AUC n/a", curve.label),
                    }
                }
            }
            Ok(())
        }
    }
}

async fn serve(ctx: AppContext, config: &DashboardConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = build_router(AppState::new(ctx, config.report_options()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server terminated unexpectedly")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
