//! Match configuration.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling on the roster: one player per capital letter.
pub const MAX_ROSTER: usize = 26;

/// Failures raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid JSON for [`GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Constants that shape a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Roster capacity (at most 26).
    pub max_players: usize,
    /// Longest player name kept; longer names are truncated.
    pub max_name_len: usize,
    /// Total gold shared out across all piles.
    pub gold_total: u32,
    /// Fewest gold piles placed.
    pub gold_min_piles: u32,
    /// Most gold piles placed.
    pub gold_max_piles: u32,
    /// Random cells tried before gold placement gives up.
    pub placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_ROSTER,
            max_name_len: 50,
            gold_total: 250,
            gold_min_piles: 10,
            gold_max_piles: 30,
            placement_attempts: 100_000,
        }
    }
}

impl GameConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a playable match.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 || self.max_players > MAX_ROSTER {
            return Err(ConfigError::Invalid(format!(
                "max_players must be in 1..={MAX_ROSTER}, got {}",
                self.max_players
            )));
        }
        if self.max_name_len == 0 {
            return Err(ConfigError::Invalid("max_name_len must be positive".into()));
        }
        if self.gold_min_piles == 0 {
            return Err(ConfigError::Invalid("gold_min_piles must be positive".into()));
        }
        if self.gold_min_piles > self.gold_max_piles {
            return Err(ConfigError::Invalid(format!(
                "gold_min_piles ({}) exceeds gold_max_piles ({})",
                self.gold_min_piles, self.gold_max_piles
            )));
        }
        if self.gold_total < self.gold_max_piles {
            return Err(ConfigError::Invalid(format!(
                "gold_total ({}) must be at least gold_max_piles ({})",
                self.gold_total, self.gold_max_piles
            )));
        }
        Ok(())
    }
}
