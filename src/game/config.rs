use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::GameError;

/// Where the snake reappears after a lethal collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPlacement {
    /// Always the center cell of the grid
    Center,
    /// A uniformly random cell
    Random,
}

/// How item effects combine when several match on the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectResolution {
    /// Growth, shrink and lethal checks all run every tick
    Independent,
    /// The first match in the order growth, shrink, lethal ends evaluation
    Exclusive,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the play field in pixels
    pub play_width: u32,
    /// Height of the play field in pixels
    pub play_height: u32,
    /// Edge length of one cell in pixels
    pub cell_size: u32,
    /// Simulation rate of the owning loop
    pub ticks_per_second: u32,

    pub reset_placement: ResetPlacement,
    pub effect_resolution: EffectResolution,
    /// Move the shrink item elsewhere after it has been eaten
    pub respawn_shrink_item: bool,
    /// Move the obstacle elsewhere whenever the snake resets
    pub relocate_obstacle_on_reset: bool,
    /// Random draws the spawner makes before enumerating free cells
    pub max_spawn_attempts: u32,
    /// Fixed RNG seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            play_width: 640,
            play_height: 480,
            cell_size: 20,
            ticks_per_second: 20,
            reset_placement: ResetPlacement::Random,
            effect_resolution: EffectResolution::Independent,
            respawn_shrink_item: true,
            relocate_obstacle_on_reset: true,
            max_spawn_attempts: 1024,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a configuration for a grid of `width` x `height` cells
    ///
    /// `u16` cell counts at the default cell size always fit the pixel fields;
    /// use [`GameConfig::with_grid`] for arbitrary sizes.
    pub fn new(width: u16, height: u16) -> Self {
        let defaults = Self::default();
        Self {
            play_width: u32::from(width) * defaults.cell_size,
            play_height: u32::from(height) * defaults.cell_size,
            ..defaults
        }
    }

    /// Same configuration resized to `width` x `height` cells of `cell_size` pixels
    pub fn with_grid(self, width: u32, height: u32, cell_size: u32) -> Result<Self, GameError> {
        if cell_size == 0 {
            return Err(GameError::InvalidConfig("cell_size must be positive".into()));
        }
        match (width.checked_mul(cell_size), height.checked_mul(cell_size)) {
            (Some(play_width), Some(play_height)) => Ok(Self {
                play_width,
                play_height,
                cell_size,
                ..self
            }),
            _ => Err(GameError::InvalidConfig(format!(
                "grid dimensions overflow: {width}x{height} cells of {cell_size}px"
            ))),
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Same configuration with a fixed RNG seed
    pub fn seeded(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Grid width in cells
    pub fn grid_width(&self) -> u32 {
        self.play_width / self.cell_size.max(1)
    }

    /// Grid height in cells
    pub fn grid_height(&self) -> u32 {
        self.play_height / self.cell_size.max(1)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.ticks_per_second.max(1)))
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.cell_size == 0 {
            return Err(GameError::InvalidConfig("cell_size must be positive".into()));
        }
        if self.grid_width() == 0 || self.grid_height() == 0 {
            return Err(GameError::InvalidConfig(format!(
                "play field {}x{} holds no {}px cell",
                self.play_width, self.play_height, self.cell_size
            )));
        }
        if i32::try_from(self.grid_width()).is_err() || i32::try_from(self.grid_height()).is_err() {
            return Err(GameError::InvalidConfig("grid dimensions overflow".into()));
        }
        if self.ticks_per_second == 0 {
            return Err(GameError::InvalidConfig(
                "ticks_per_second must be positive".into(),
            ));
        }
        if self.max_spawn_attempts == 0 {
            return Err(GameError::InvalidConfig(
                "max_spawn_attempts must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to parse game config")?;
        config.validate().context("Invalid game config")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize game config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}
