//! Environment-based configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `MINDSCOPE_DB_PATH` | `data/mindscope.db` |
//! | `MINDSCOPE_LOG_MODE` | `auto` (`file` when stdout is a terminal, else `stderr`) |
//! | `MINDSCOPE_LOG_FILE` | `data/mindscope.log` |
//! | `MINDSCOPE_TRAINING_SEED` | `42` |
//! | `MINDSCOPE_TEST_SIZE` | `0.2` |
//! | `MINDSCOPE_ALLOW_ARTIFACT_OVERWRITE` | `false` |
//!
//! `MINDSCOPE_SANITIZE_MAX_BYTES` is read directly by the log sanitizer and
//! only validated here.

use std::path::PathBuf;

use crate::adapters::sanitize::SANITIZE_MAX_BYTES_ENV;
use crate::application::TrainingConfig;
use crate::MindscopeError;

pub const DB_PATH_ENV: &str = "MINDSCOPE_DB_PATH";
pub const LOG_MODE_ENV: &str = "MINDSCOPE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "MINDSCOPE_LOG_FILE";
pub const TRAINING_SEED_ENV: &str = "MINDSCOPE_TRAINING_SEED";
pub const TEST_SIZE_ENV: &str = "MINDSCOPE_TEST_SIZE";
pub const ALLOW_OVERWRITE_ENV: &str = "MINDSCOPE_ALLOW_ARTIFACT_OVERWRITE";

const DEFAULT_DB_PATH: &str = "data/mindscope.db";
const DEFAULT_LOG_FILE: &str = "data/mindscope.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal, stderr otherwise
    Auto,
    File,
    Stdout,
    Stderr,
}

impl LogMode {
    fn parse(value: &str) -> Result<Self, MindscopeError> {
        match value {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(MindscopeError::Config(format!(
                "{LOG_MODE_ENV} must be one of auto, file, stdout, stderr; got {other:?}"
            ))),
        }
    }
}

/// Boolean flag: `1`, `true` or `yes` (any case) enable it.
fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Let training replace an existing artifact bundle
    pub allow_overwrite: bool,
    pub training: TrainingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            allow_overwrite: false,
            training: TrainingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `MindscopeError::Config` for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self, MindscopeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (variable name to value).
    ///
    /// # Errors
    /// Returns `MindscopeError::Config` for unparsable or out-of-range values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MindscopeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(mode) = lookup(LOG_MODE_ENV) {
            config.log_mode = LogMode::parse(mode.trim())?;
        }
        if let Some(path) = lookup(LOG_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(path.trim());
        }
        config.allow_overwrite = parse_bool(lookup(ALLOW_OVERWRITE_ENV).as_deref());

        // Read lazily by the sanitizer; checked here so a typo fails at startup
        if let Some(cap) = lookup(SANITIZE_MAX_BYTES_ENV) {
            if !cap.trim().parse::<usize>().is_ok_and(|v| v > 0) {
                return Err(MindscopeError::Config(format!(
                    "{SANITIZE_MAX_BYTES_ENV} must be a positive integer, got {cap:?}"
                )));
            }
        }

        if let Some(seed) = lookup(TRAINING_SEED_ENV) {
            config.training.seed = seed.trim().parse::<u64>().map_err(|_| {
                MindscopeError::Config(format!("{TRAINING_SEED_ENV} must be a u64, got {seed:?}"))
            })?;
            config.training.params = config.training.params.with_seed(config.training.seed);
        }
        if let Some(size) = lookup(TEST_SIZE_ENV) {
            let parsed = size.trim().parse::<f64>().ok().filter(|v| *v > 0.0 && *v < 1.0);
            config.training.test_size = parsed.ok_or_else(|| {
                MindscopeError::Config(format!("{TEST_SIZE_ENV} must be in (0, 1), got {size:?}"))
            })?;
        }

        Ok(config)
    }
}
