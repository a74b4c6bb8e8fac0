pub mod ai;
pub mod config;
pub mod data;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod game;
pub mod map;
pub mod render;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, MapError};
pub use game::{Game, GameStatus, MoveOutcome};
