use std::{fs, path::Path};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    pub monsters_per_level: usize,
    pub items_per_level: usize,
    pub boss_width: i32,
    pub boss_height: i32,
    pub seed: Option<u64>,
    pub message_radius: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 48,
            depth: 6,
            monsters_per_level: 15,
            items_per_level: 15,
            boss_width: 80,
            boss_height: 24,
            seed: None,
            message_radius: 5,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.as_ref().display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn resolved_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64)
    }
}
