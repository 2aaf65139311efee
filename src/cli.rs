//! CLI command implementations for Nuggets.

pub(crate) mod serve;
pub(crate) mod simulate;
pub(crate) mod validate;

mod output;

use clap::{Args, ValueEnum};
use nuggets::{ConfigError, GameConfig, GameError, GridError, ServerError};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format for the `simulate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Match settings shared by every command.
///
/// Flags override values from `--config`, which override the defaults.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct Tuning {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total gold in the match
    #[arg(long)]
    gold: Option<u32>,

    /// Fewest gold piles
    #[arg(long)]
    min_piles: Option<u32>,

    /// Most gold piles
    #[arg(long)]
    max_piles: Option<u32>,
}

impl Tuning {
    /// Resolve the match config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or the result is
    /// not a playable config.
    pub(crate) fn resolve(&self) -> Result<GameConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(gold) = self.gold {
            config.gold_total = gold;
        }
        if let Some(min) = self.min_piles {
            config.gold_min_piles = min;
        }
        if let Some(max) = self.max_piles {
            config.gold_max_piles = max;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Install the stderr log subscriber, honoring `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub(crate) fn init_logging() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nuggets=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::new(format!("logging not initialized: {e}")))
}

/// Seed from the clock when none was given.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GameError> for CliError {
    fn from(e: GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        Self::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_reports_second_install() {
        let _ = init_logging();
        let err = init_logging().unwrap_err();
        assert!(err.to_string().starts_with("logging not initialized"));
    }

    #[test]
    fn test_tuning_flags_override_defaults() {
        let tuning = Tuning {
            gold: Some(40),
            min_piles: Some(2),
            max_piles: Some(4),
            ..Tuning::default()
        };
        let config = tuning.resolve().unwrap();
        assert_eq!(config.gold_total, 40);
        assert_eq!((config.gold_min_piles, config.gold_max_piles), (2, 4));
    }
}
