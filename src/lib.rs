//! Grid Snake - a snake simulation on a wrapping grid
//!
//! This library provides:
//! - Core simulation (game module): direction buffering, toroidal movement,
//!   growth/shrink items, a lethal obstacle and collision-free spawning
//! - Terminal input mapping and rendering (input, render modules)
//! - Interactive and headless execution modes (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
