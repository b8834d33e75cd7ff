//! Mindscope: depression/anxiety self-assessment.
//!
//! Reads one assessment request (JSON) and prints the scored outcome.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- <assessment.json|-> [--db <path>]
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use mindscope::adapters::sqlite::SqliteArtifactStore;
use mindscope::application::{AssessmentRequest, InferenceService};
use mindscope::config::AppConfig;
use mindscope::logging;

fn usage() -> String {
    "Usage: mindscope <assessment.json|-> [--db <path>]\n\nReads an assessment request (use '-' for stdin) and prints the outcome as JSON.".to_string()
}

fn parse_args() -> Result<(String, Option<PathBuf>), String> {
    let mut args = std::env::args().skip(1);
    let mut input: Option<String> = None;
    let mut db: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let v = args.next().ok_or_else(usage)?;
                db = Some(PathBuf::from(v));
            }
            "-h" | "--help" => return Err(usage()),
            _ if input.is_none() => input = Some(arg),
            _ => return Err(usage()),
        }
    }

    Ok((input.ok_or_else(usage)?, db))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

fn main() -> Result<()> {
    let (input, db) = match parse_args() {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let mut config = AppConfig::from_env()?;
    if let Some(db) = db {
        config.db_path = db;
    }
    let _guard = logging::init(&config).context("Failed to initialize logging")?;

    tracing::info!("Starting Mindscope assessment...");

    let request: AssessmentRequest =
        serde_json::from_str(&read_input(&input)?).context("Invalid assessment request")?;

    let store = SqliteArtifactStore::new(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
    let service = InferenceService::load(&store)?;
    let outcome = service.assess_request(request)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    tracing::info!("Assessment complete.");
    Ok(())
}
