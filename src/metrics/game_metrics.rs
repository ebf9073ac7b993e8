use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::game::{CollisionType, StepResult};

/// Counters accumulated over a session of many episodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeTally {
    pub ticks: u64,
    pub episodes: u32,
    pub growth_eaten: u32,
    pub shrink_eaten: u32,
    pub self_collisions: u32,
    pub obstacle_collisions: u32,
    pub best_length: usize,
}

impl EpisodeTally {
    pub fn record(&mut self, result: &StepResult, length: usize) {
        self.ticks += 1;
        if result.info.ate_growth {
            self.growth_eaten += 1;
        }
        if result.info.ate_shrink {
            self.shrink_eaten += 1;
        }
        if let Some(reset) = &result.reset {
            self.episodes += 1;
            self.best_length = self.best_length.max(reset.length);
            match reset.cause {
                CollisionType::SelfCollision => self.self_collisions += 1,
                CollisionType::Obstacle => self.obstacle_collisions += 1,
            }
        }
        self.best_length = self.best_length.max(length);
    }
}

pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub tally: EpisodeTally,
    /// Set while the clock is frozen
    paused_at: Option<Instant>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            tally: EpisodeTally::default(),
            paused_at: None,
        }
    }

    pub fn update(&mut self) {
        let now = self.paused_at.unwrap_or_else(Instant::now);
        self.elapsed_time = now.saturating_duration_since(self.start_time);
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freeze the episode clock
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Resume the clock, leaving the paused span out of the elapsed time
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.start_time += paused_at.elapsed();
        }
    }

    /// Restart the episode clock
    pub fn on_episode_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.paused_at = None;
    }

    pub fn on_step(&mut self, result: &StepResult, length: usize) {
        self.tally.record(result, length);
        if result.reset.is_some() {
            self.on_episode_start();
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
