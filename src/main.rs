//! Prediction bot: directional forecasts for tradable instruments.
//!
//! Single-binary Tokio application that:
//! 1. Loads market data collections from a JSON data directory
//! 2. Generates forecasts from historical analogues and sentiment
//! 3. Grades overdue forecasts against realized quotes
//! 4. Publishes events to the log and a JSONL journal

mod config;
mod journal;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time::sleep;
use tracing::{error, info, warn};

use market_store::{flush_predictions, load_data_dir, MemoryStore};
use prediction_engine::{GenerateOutcome, PredictionGenerator, PredictionValidator};

use common::stores::CompanyStore;

/// Market prediction bot
#[derive(Parser)]
#[command(name = "prediction-bot", about = "Market prediction engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a forecast for one company and exit.
    Generate {
        /// Company id to forecast.
        #[arg(long)]
        company: String,
    },
    /// Grade all overdue open forecasts and exit.
    Validate,
    /// Run generator and validator sweeps on a schedule.
    Run,
}

struct App {
    store: Arc<MemoryStore>,
    generator: Arc<PredictionGenerator>,
    validator: Arc<PredictionValidator>,
    data_dir: PathBuf,
}

fn build_app(cfg: &common::config::BotConfig) -> Result<App, common::Error> {
    let data_dir = PathBuf::from(&cfg.data_dir);
    let store = Arc::new(load_data_dir(&data_dir)?);
    let sink = Arc::new(journal::EventJournal::open(PathBuf::from(&cfg.journal_dir))?);

    let generator = Arc::new(PredictionGenerator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        sink.clone(),
        cfg.engine.clone(),
    ));
    let validator = Arc::new(PredictionValidator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        sink,
    ));

    Ok(App {
        store,
        generator,
        validator,
        data_dir,
    })
}

fn run_generate(app: &App, company: &str) -> Result<(), common::Error> {
    let outcome = app.generator.generate(company)?;
    match &outcome {
        GenerateOutcome::Created(id) => info!("Forecast created [{}]", id),
        GenerateOutcome::UpdatedCertainty(id) => info!("Forecast certainty updated [{}]", id),
        GenerateOutcome::DuplicateDiscarded => info!("Duplicate forecast discarded"),
        GenerateOutcome::Skipped(reason) => info!("No forecast produced: {}", reason),
    }
    flush_predictions(&app.store, &app.data_dir)
}

fn run_validate(app: &App) -> Result<(), common::Error> {
    let summary = app.validator.validate_all()?;
    info!(
        "Validation sweep: resolved={} still_open={} missing_requests={}",
        summary.resolved, summary.still_open, summary.missing_requests
    );
    flush_predictions(&app.store, &app.data_dir)
}

fn run_generate_sweep(app: &App) {
    let ids = match app.store.company_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Failed to list companies: {}", e);
            return;
        }
    };
    info!("Generator sweep over {} companies", ids.len());
    for id in ids {
        if let Err(e) = app.generator.generate(&id) {
            warn!("Generation failed for company [{}]: {}", id, e);
        }
    }
    if let Err(e) = flush_predictions(&app.store, &app.data_dir) {
        warn!("Failed to flush predictions: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "prediction_bot=info,prediction_engine=info,market_store=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Prediction bot starting up...");

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Engine: window={} history={} lookback={}d validity={}d",
        cfg.engine.quote_window,
        cfg.engine.prediction_history_limit,
        cfg.engine.certainty_lookback_days,
        cfg.engine.validity_days,
    );

    let app = match build_app(&cfg) {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };
    let app = Arc::new(app);

    match cli.command {
        Command::Generate { company } => {
            if let Err(e) = run_generate(&app, &company) {
                error!("Generation failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Validate => {
            if let Err(e) = run_validate(&app) {
                error!("Validation failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Run => run_scheduled(app, &cfg).await,
    }
}

async fn run_scheduled(app: Arc<App>, cfg: &common::config::BotConfig) {
    info!("Spawning tasks...");

    // Task 1: generator sweep.
    let gen_app = app.clone();
    let gen_interval = cfg.timing.generate_interval_secs;
    let generate_handle = tokio::spawn(async move {
        loop {
            run_generate_sweep(&gen_app);
            sleep(Duration::from_secs(gen_interval)).await;
        }
    });

    // Task 2: validation sweep.
    let val_app = app.clone();
    let val_interval = cfg.timing.validate_interval_secs;
    let validate_handle = tokio::spawn(async move {
        loop {
            if let Err(e) = run_validate(&val_app) {
                warn!("Validation sweep failed: {}", e);
            }
            sleep(Duration::from_secs(val_interval)).await;
        }
    });

    // Task 3: heartbeat.
    let hb_app = app.clone();
    let hb_interval = cfg.timing.heartbeat_interval_secs;
    let heartbeat_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(hb_interval));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let companies = hb_app.store.company_ids().map(|c| c.len()).unwrap_or(0);
            let predictions = hb_app.store.prediction_count().unwrap_or(0);
            info!(
                "HEARTBEAT: companies={} predictions={}",
                companies, predictions
            );
        }
    });

    info!("Prediction bot is running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = generate_handle => {
            error!("Generator task exited: {:?}", r);
        }
        r = validate_handle => {
            error!("Validator task exited: {:?}", r);
        }
        r = heartbeat_handle => {
            error!("Heartbeat task exited: {:?}", r);
        }
    }

    info!("Prediction bot shut down.");
}
