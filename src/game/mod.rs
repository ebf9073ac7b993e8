//! Core simulation for the grid snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! A caller feeds direction intents in, calls [`GameEngine::step`] once per tick,
//! and reads a [`Snapshot`] back out for drawing.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod spawner;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{EffectResolution, GameConfig, ResetPlacement};
pub use engine::{CollisionType, GameEngine, ResetEvent, StepInfo, StepResult};
pub use error::GameError;
pub use grid::Grid;
pub use spawner::Spawner;
pub use state::{GameState, Item, ItemKind, Position, Shape, Snake, Snapshot};
