use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// A configuration value the engine cannot run with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Every cell of the grid is occupied, so no item can be placed.
    #[error("no free cell to spawn into ({occupied} of {cells} cells occupied)")]
    SpawnExhausted { occupied: usize, cells: usize },
}
