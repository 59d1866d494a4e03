use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    get_difficulty_profile, DEFAULT_LIFE_COUNT, EMPOWERMENT_SECONDS, RESPAWN_SECONDS,
};
use crate::error::ConfigError;
use crate::types::Difficulty;

pub const ENV_UPDATE_FREQUENCY: &str = "MAZE_CHASE_UPDATE_FREQUENCY";
pub const ENV_TICK_MS: &str = "MAZE_CHASE_TICK_MS";
pub const ENV_EMPOWER_TICKS: &str = "MAZE_CHASE_EMPOWER_TICKS";
pub const ENV_LIVES: &str = "MAZE_CHASE_LIVES";
pub const ENV_RESPAWN_TICKS: &str = "MAZE_CHASE_RESPAWN_TICKS";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    #[serde(rename = "adversaryUpdateFrequency")]
    pub adversary_update_frequency: u32,
    #[serde(rename = "tickDurationMs")]
    pub tick_duration_ms: u64,
    #[serde(rename = "empowermentDurationTicks")]
    pub empowerment_duration_ticks: u32,
    #[serde(rename = "lifeCount")]
    pub life_count: u32,
    #[serde(rename = "respawnDurationTicks")]
    pub respawn_duration_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

impl SimulationConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let (tick_rate, update_frequency) = get_difficulty_profile(difficulty);
        Self {
            adversary_update_frequency: update_frequency,
            tick_duration_ms: 1000 / tick_rate as u64,
            empowerment_duration_ticks: tick_rate * EMPOWERMENT_SECONDS,
            life_count: DEFAULT_LIFE_COUNT,
            respawn_duration_ticks: tick_rate * RESPAWN_SECONDS,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adversary_update_frequency == 0 {
            return Err(ConfigError::Zero {
                field: "adversary_update_frequency",
            });
        }
        if self.tick_duration_ms == 0 {
            return Err(ConfigError::Zero {
                field: "tick_duration_ms",
            });
        }
        if self.empowerment_duration_ticks == 0 {
            return Err(ConfigError::Zero {
                field: "empowerment_duration_ticks",
            });
        }
        if self.life_count == 0 {
            return Err(ConfigError::Zero {
                field: "life_count",
            });
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_override::<u32, _>(&lookup, ENV_UPDATE_FREQUENCY)? {
            self.adversary_update_frequency = value;
        }
        if let Some(value) = parse_override::<u64, _>(&lookup, ENV_TICK_MS)? {
            self.tick_duration_ms = value;
        }
        if let Some(value) = parse_override::<u32, _>(&lookup, ENV_EMPOWER_TICKS)? {
            self.empowerment_duration_ticks = value;
        }
        if let Some(value) = parse_override::<u32, _>(&lookup, ENV_LIVES)? {
            self.life_count = value;
        }
        if let Some(value) = parse_override::<u32, _>(&lookup, ENV_RESPAWN_TICKS)? {
            self.respawn_duration_ticks = value;
        }
        self.validate()
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidOverride {
            key: key.to_string(),
            value: raw,
        })
}
