//! Headless mode driven by a random pilot
//!
//! Runs the engine for a fixed number of ticks without a terminal. Each tick
//! the pilot may request a random turn; the engine drops reversals as it would
//! for a human. The run is summarised in an [`AutoplayReport`], optionally
//! written to disk as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_snake::modes::{AutoplayConfig, AutoplayMode};
//!
//! let mut mode = AutoplayMode::new(AutoplayConfig::new(10_000))?;
//! let report = mode.run()?;
//! println!("best length {}", report.tally.best_length);
//! ```

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::{Direction, GameConfig, GameEngine, Snapshot};
use crate::metrics::EpisodeTally;

/// Configuration for autoplay mode
#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    /// Number of ticks to simulate
    pub ticks: u64,

    /// Probability of requesting a turn on any tick
    pub turn_chance: f64,

    /// Where to write the JSON report, if anywhere
    pub report_path: Option<PathBuf>,

    /// Log a progress line every N ticks
    pub log_frequency: u64,

    pub game_config: GameConfig,
}

impl AutoplayConfig {
    pub fn new(ticks: u64) -> Self {
        Self {
            ticks,
            turn_chance: 0.2,
            report_path: None,
            log_frequency: 1000,
            game_config: GameConfig::default(),
        }
    }
}

/// Outcome of an autoplay run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoplayReport {
    pub seed: Option<u64>,
    pub tally: EpisodeTally,
    pub final_snapshot: Snapshot,
}

impl AutoplayReport {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        serde_json::from_str(&json).context("Failed to deserialize report")
    }
}

pub struct AutoplayMode {
    engine: GameEngine,
    pilot: StdRng,
    tally: EpisodeTally,
    config: AutoplayConfig,
}

impl AutoplayMode {
    pub fn new(config: AutoplayConfig) -> Result<Self> {
        let engine =
            GameEngine::new(config.game_config.clone()).context("Failed to create game engine")?;
        // Offset keeps the pilot's stream independent of the spawner's
        let pilot = match config.game_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            engine,
            pilot,
            tally: EpisodeTally::default(),
            config,
        })
    }

    pub fn run(&mut self) -> Result<AutoplayReport> {
        info!(
            "Autoplay: {} ticks, turn chance {:.2}",
            self.config.ticks, self.config.turn_chance
        );

        for tick in 1..=self.config.ticks {
            self.run_tick()?;
            if self.config.log_frequency > 0 && tick % self.config.log_frequency == 0 {
                info!(
                    "[tick {}/{}] episodes {} best length {} current length {}",
                    tick,
                    self.config.ticks,
                    self.tally.episodes,
                    self.tally.best_length,
                    self.engine.state().snake.length()
                );
            }
        }

        let report = AutoplayReport {
            seed: self.config.game_config.seed,
            tally: self.tally.clone(),
            final_snapshot: self.engine.snapshot(),
        };

        if let Some(path) = &self.config.report_path {
            report.save(path)?;
            info!("Report written to {}", path.display());
        }

        Ok(report)
    }

    fn run_tick(&mut self) -> Result<()> {
        if self.pilot.gen_bool(self.config.turn_chance.clamp(0.0, 1.0)) {
            let direction = Direction::ALL[self.pilot.gen_range(0..Direction::ALL.len())];
            self.engine.buffer_direction(direction);
        }
        let result = self.engine.step().context("Simulation step failed")?;
        self.tally.record(&result, self.engine.state().snake.length());
        Ok(())
    }
}
