use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::{GameConfig, ResetPlacement};
use grid_snake::logging::{init_file_logger, init_term_logger};
use grid_snake::modes::{AutoplayConfig, AutoplayMode, HumanMode};
use log::{info, LevelFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a wrapping grid with apples, poison and rocks")]
struct Cli {
    /// Game mode
    #[arg(long, default_value = "human")]
    mode: Mode,

    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Cell edge in pixels
    #[arg(long)]
    cell_size: Option<u32>,

    /// Simulation ticks per second
    #[arg(long)]
    tps: Option<u32>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Where the snake reappears after a crash
    #[arg(long)]
    reset_placement: Option<Placement>,

    /// Ticks to simulate in autoplay mode
    #[arg(long, default_value = "10000")]
    ticks: u64,

    /// Write the autoplay report to this JSON file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log file for human mode
    #[arg(long, default_value = "grid_snake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play with the keyboard
    Human,
    /// Headless run with a random pilot
    Autoplay,
}

#[derive(Clone, ValueEnum)]
enum Placement {
    Center,
    Random,
}

impl From<Placement> for ResetPlacement {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Center => ResetPlacement::Center,
            Placement::Random => ResetPlacement::Random,
        }
    }
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if self.width.is_some() || self.height.is_some() || self.cell_size.is_some() {
            let width = self.width.unwrap_or(config.grid_width());
            let height = self.height.unwrap_or(config.grid_height());
            let cell_size = self.cell_size.unwrap_or(config.cell_size);
            config = config
                .with_grid(width, height, cell_size)
                .context("Invalid grid size")?;
        }
        if let Some(tps) = self.tps {
            config.ticks_per_second = tps;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(placement) = self.reset_placement.clone() {
            config.reset_placement = placement.into();
        }

        config.validate().context("Invalid game settings")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.mode {
        Mode::Human => init_file_logger(&cli.log_file, cli.log_level)?,
        Mode::Autoplay => init_term_logger(cli.log_level)?,
    }

    let config = cli.game_config()?;
    info!(
        "Starting grid_snake on a {}x{} grid",
        config.grid_width(),
        config.grid_height()
    );

    match cli.mode {
        Mode::Human => {
            let mut human_mode = HumanMode::new(config)?;
            human_mode.run().await?;
        }
        Mode::Autoplay => {
            let mut autoplay_config = AutoplayConfig::new(cli.ticks);
            autoplay_config.report_path = cli.report.clone();
            autoplay_config.game_config = config;
            let report = AutoplayMode::new(autoplay_config)?.run()?;
            info!(
                "Autoplay finished: {} episodes, best length {}",
                report.tally.episodes, report.tally.best_length
            );
        }
    }

    Ok(())
}
