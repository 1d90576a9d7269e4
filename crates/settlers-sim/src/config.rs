//! Simulation settings read from the environment.

use settlers_core::GameConfig;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_MATCHES: u32 = 1;
const DEFAULT_PLAYERS: usize = 4;
const DEFAULT_MAX_ACTIONS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid game config: {0}")]
    Json(#[from] serde_json::Error),
}

/// How many matches to run and with what rules
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub matches: u32,
    pub players: usize,
    /// Seed of the first match; later matches count up from it
    pub seed: u64,
    pub game: GameConfig,
}

impl SimConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source, for tests
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut game = match lookup("SIM_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path, source })?;
                serde_json::from_str(&raw)?
            }
            None => GameConfig::default(),
        };
        let max_actions = parse(&lookup, "SIM_MAX_ACTIONS")?
            .or(game.max_turn_actions)
            .unwrap_or(DEFAULT_MAX_ACTIONS);
        game.max_turn_actions = Some(max_actions);

        Ok(Self {
            matches: parse(&lookup, "SIM_MATCHES")?.unwrap_or(DEFAULT_MATCHES),
            players: parse(&lookup, "SIM_PLAYERS")?.unwrap_or(DEFAULT_PLAYERS),
            seed: parse(&lookup, "SIM_SEED")?.unwrap_or_else(rand::random),
            game,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}
