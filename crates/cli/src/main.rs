//! # leakwatch
//!
//! Command-line interface for the leak-detection engine.

use std::path::PathBuf;
use std::process::ExitCode;

use anomaly::{AnomalyDetector, IsolationForest, IsolationForestConfig};
use clap::{Parser, Subcommand};
use engine::{DetectionEngine, EngineConfig};

#[derive(Parser)]
#[command(name = "leakwatch")]
#[command(about = "Water-flow leak detection CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a live flow reading against stored history
    Classify {
        /// Usage history CSV (created and seeded if missing)
        #[arg(short, long)]
        store: PathBuf,

        /// Live flow rate to classify
        #[arg(short, long)]
        live: f64,

        /// Total usage to record for the current hour
        #[arg(short, long)]
        total: Option<f64>,
    },

    /// Forecast usage beyond the stored history
    Forecast {
        /// Usage history CSV (created and seeded if missing)
        #[arg(short, long)]
        store: PathBuf,

        /// Number of hourly steps to forecast
        #[arg(long, default_value = "24")]
        steps: usize,
    },

    /// Flag anomalous hours in the stored history
    Detect {
        /// Usage history CSV (created and seeded if missing)
        #[arg(short, long)]
        store: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Classify { store, live, total } => {
            let mut engine = DetectionEngine::open(store, EngineConfig::default())?;
            let verdict = engine.ingest(live, total)?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Forecast { store, steps } => {
            let engine = DetectionEngine::open(store, EngineConfig::default())?;
            let predictions = engine.predict_usage(steps);
            println!("{}", serde_json::to_string_pretty(&predictions)?);
        }
        Commands::Detect { store } => {
            let engine = DetectionEngine::open(store, EngineConfig::default())?;
            let readings = engine.store().series().readings().to_vec();
            let values: Vec<f64> = readings.iter().map(|r| r.usage).collect();

            let mut forest = IsolationForest::new(IsolationForestConfig::default());
            forest.fit(&values)?;
            let result = forest.detect(&values)?;

            for (reading, (flagged, score)) in readings
                .iter()
                .zip(result.is_anomaly.iter().zip(result.scores.iter()))
            {
                if *flagged {
                    println!(
                        "{}  usage={:.2}  score={:.4}",
                        reading.timestamp.format("%Y-%m-%d %H:%M"),
                        reading.usage,
                        score
                    );
                }
            }
        }
    }
    Ok(())
}
