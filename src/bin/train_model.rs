//! Offline training for the Mindscope risk classifier.
//!
//! Reads a survey export, trains every model family, keeps the most
//! accurate one and persists the artifact bundle to SQLite.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train_model -- <dataset.csv> [--db <path>] [--seed <n>] [--force] [--json]
//! ```
//!
//! An existing bundle is only replaced with `--force` or
//! `MINDSCOPE_ALLOW_ARTIFACT_OVERWRITE=1`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use mindscope::adapters::csv_dataset::CsvDataset;
use mindscope::adapters::sqlite::SqliteArtifactStore;
use mindscope::application::{TrainedArtifact, TrainingReport, TrainingService};
use mindscope::config::AppConfig;
use mindscope::logging;

struct Args {
    dataset: PathBuf,
    db: Option<PathBuf>,
    seed: Option<u64>,
    force: bool,
    json: bool,
}

fn usage() -> String {
    "Usage: train_model <dataset.csv> [--db <path>] [--seed <n>] [--force] [--json]\n\nTrains the risk classifier and stores the artifact bundle.".to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut dataset: Option<PathBuf> = None;
    let mut db: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut force = false;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let v = args.next().ok_or_else(usage)?;
                db = Some(PathBuf::from(v));
            }
            "--seed" => {
                let v = args.next().ok_or_else(usage)?;
                seed = Some(v.parse().map_err(|_| "Invalid --seed".to_string())?);
            }
            "--force" => force = true,
            "--json" => json = true,
            "-h" | "--help" => return Err(usage()),
            _ if dataset.is_none() => dataset = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    Ok(Args {
        dataset: dataset.ok_or_else(usage)?,
        db,
        seed,
        force,
        json,
    })
}

fn print_report(report: &TrainingReport) {
    println!(
        "Rows: {} (train {}, test {})",
        report.n_rows, report.n_train, report.n_test
    );
    println!("Label distribution:");
    for (tier, count) in &report.label_counts {
        println!("  {:<10} {count}", tier.as_str());
    }
    println!();
    for model in &report.models {
        println!(
            "{:<20} train acc {:.4}  test acc {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}",
            model.family.display_name(),
            model.train_accuracy,
            model.test.accuracy,
            model.test.precision,
            model.test.recall,
            model.test.f1,
        );
    }
    println!();
    if let Some(best) = report.selected_report() {
        println!("Selected: {}", best.family);
        let header: Vec<&str> = best.confusion.classes.iter().map(|c| c.as_str()).collect();
        println!("Confusion matrix (rows = true, columns = predicted): {header:?}");
        for (class, row) in best.confusion.classes.iter().zip(&best.confusion.counts) {
            println!("  {:<10} {row:?}", class.as_str());
        }
    }
    println!("Fingerprint: {}", report.fingerprint);
}

fn main() -> Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let mut config = AppConfig::from_env()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
        config.training.params = config.training.params.with_seed(seed);
    }
    let _guard = logging::init(&config).context("Failed to initialize logging")?;

    let store = Arc::new(
        SqliteArtifactStore::new(&config.db_path)
            .with_context(|| format!("Failed to open {}", config.db_path.display()))?,
    );

    if TrainedArtifact::exists(store.as_ref())? && !(args.force || config.allow_overwrite) {
        bail!(
            "Artifacts already exist in {}; pass --force to replace them",
            config.db_path.display()
        );
    }

    let service = TrainingService::new(Arc::clone(&store), config.training.clone());
    let report = service.train(&CsvDataset::from_path(&args.dataset))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
