use specs::prelude::Entity;
use thiserror::Error;

use crate::{ai::Task, engine::EngineError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("position {x},{y},{z} is outside the map")]
    OutOfBounds { x: i32, y: i32, z: i32 },
    #[error("tried to add an entity at an occupied position {x},{y},{z}")]
    Occupied { x: i32, y: i32, z: i32 },
    #[error("entity {0:?} has no position")]
    NotPlaced(Entity),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("undefined task {0:?}")]
    UndefinedTask(Task),
    #[error("no template named '{name}' in the {repository} repository")]
    UnknownTemplate {
        repository: &'static str,
        name: String,
    },
    #[error("entity {entity:?} is missing its {component} component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
