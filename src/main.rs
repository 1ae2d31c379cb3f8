use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use servicemedic::config::{LogFormat, LoggingConfig, MedicConfig};
use servicemedic::detect::scoring::{self, Prediction};
use servicemedic::detect::FeatureSnapshot;
use servicemedic::synth;

#[derive(Parser)]
#[command(
    name = "servicemedic",
    about = "Deterministic incident triage for service telemetry",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the triage API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify telemetry snapshots from a JSON file
    Triage {
        /// Input file: a snapshot object, an array, or {"data": [...]}
        #[arg(long)]
        input: PathBuf,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Generate synthetic telemetry and run it through the classifier
    Simulate {
        /// Number of snapshots to generate
        #[arg(long, default_value = "10")]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, config } => {
            let mut config = match config {
                Some(path) => MedicConfig::load(&path)?,
                None => MedicConfig::load_or_default(),
            };
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            init_tracing(&config.logging);
            tracing::info!(bind = %config.server.bind, "Starting ServiceMedic daemon");
            servicemedic::serve(config).await?;
        }
        Commands::Triage { input, json } => {
            init_tracing(&LoggingConfig::default());
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read input file: {}", input.display()))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse JSON in {}", input.display()))?;

            let mut predictions = Vec::new();
            let mut skipped = 0usize;
            for row in snapshot_rows(value) {
                match serde_json::from_value::<FeatureSnapshot>(row) {
                    Ok(snapshot) => predictions.push(scoring::predict(snapshot)),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unparseable telemetry row");
                        skipped += 1;
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&predictions)?);
            } else {
                for prediction in &predictions {
                    print_report(prediction);
                }
                if skipped > 0 {
                    println!("({} row(s) skipped as unparseable)", skipped);
                }
            }
        }
        Commands::Simulate { count, seed, json } => {
            init_tracing(&LoggingConfig::default());
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let mut rows = Vec::with_capacity(count);
            for _ in 0..count {
                let (scenario, snapshot) = synth::generate_labeled(&mut rng);
                rows.push((scenario, scoring::predict(snapshot)));
            }

            if json {
                let out: Vec<Value> = rows
                    .iter()
                    .map(|(scenario, prediction)| {
                        serde_json::json!({ "scenario": scenario, "prediction": prediction })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!(
                    "{:<4} | {:<13} | {:<13} | {:<9} | {:<11} | Score",
                    "#", "Scenario", "Verdict", "Severity", "Confidence"
                );
                println!(
                    "{:-<4}-|-{:-<13}-|-{:-<13}-|-{:-<9}-|-{:-<11}-|-{:-<5}",
                    "", "", "", "", "", ""
                );
                for (i, (scenario, p)) in rows.iter().enumerate() {
                    println!(
                        "{:<4} | {:<13} | {:<13} | {:<9} | {:<11} | {:.2}",
                        i + 1,
                        scenario.to_string(),
                        p.incident_type.to_string(),
                        p.severity.to_string(),
                        format!("{:.0}%", p.confidence * 100.0),
                        p.anomaly_score
                    );
                }
            }
        }
    }

    Ok(())
}

/// Accept the payload shapes upstream tooling produces: a bare array, a
/// single snapshot object, or an envelope with a "data" array.
fn snapshot_rows(input: Value) -> Vec<Value> {
    match input {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(rows)) => rows,
            Some(single) => vec![single],
            None => vec![Value::Object(obj)],
        },
        other => vec![other],
    }
}

fn print_report(prediction: &Prediction) {
    println!("\n=== ServiceMedic Triage Report ===");
    println!("Verdict:    {} ({})", prediction.incident_type, prediction.severity);
    println!("Confidence: {:.0}%", prediction.confidence * 100.0);
    println!(
        "Anomaly:    {} (score {:.2})",
        if prediction.is_anomaly { "yes" } else { "no" },
        prediction.anomaly_score
    );
    println!("Summary:    {}", prediction.description);
    println!("Evidence:");
    for indicator in &prediction.indicators {
        println!(" - {}", indicator);
    }
    println!("==================================\n");
}
