use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::Duration;
use tokio::time::interval;

use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self> {
        let engine = GameEngine::new(config).context("Failed to create game engine")?;

        Ok(Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            "Session over: {} ticks, {} resets, best length {}",
            self.metrics.tally.ticks, self.metrics.tally.episodes, self.metrics.tally.best_length
        );
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks at the configured rate
        let mut tick_timer = interval(self.engine.config().tick_interval());

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.update_game()?;
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let snapshot = self.engine.snapshot();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            &snapshot,
                            self.engine.grid(),
                            &self.metrics,
                            self.paused,
                        );
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    if !self.paused {
                        self.engine.buffer_direction(direction);
                    }
                }
                KeyAction::Restart => self.restart_game()?,
                KeyAction::TogglePause => self.toggle_pause(),
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let result = self.engine.step().context("Simulation step failed")?;
        self.metrics.on_step(&result, self.engine.state().snake.length());
        Ok(())
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            self.metrics.pause();
        } else {
            self.metrics.resume();
        }
    }

    fn restart_game(&mut self) -> Result<()> {
        self.engine.restart().context("Failed to restart game")?;
        self.metrics.on_episode_start();
        self.paused = false;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mode() -> HumanMode {
        HumanMode::new(GameConfig::default().seeded(8)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.engine.state().snake.head(), Position::new(16, 12));
        assert!(!mode.paused);
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_arrow_key_buffers_turn() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Up)).unwrap();
        assert_eq!(mode.engine.state().snake.pending_direction(), Some(Direction::Up));
    }

    #[test]
    fn test_pause_blocks_input() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char(' '))).unwrap();
        assert!(mode.paused);
        mode.handle_event(key(KeyCode::Down)).unwrap();
        assert_eq!(mode.engine.state().snake.pending_direction(), None);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char('p'))).unwrap();
        assert!(mode.metrics.is_paused());
        std::thread::sleep(Duration::from_millis(60));
        mode.handle_event(key(KeyCode::Char('p'))).unwrap();
        assert!(!mode.paused);
        assert!(!mode.metrics.is_paused());
        mode.metrics.update();
        assert!(mode.metrics.elapsed_time.as_millis() < 50);
    }

    #[test]
    fn test_game_reset() {
        let mut mode = mode();
        for _ in 0..5 {
            mode.update_game().unwrap();
        }
        mode.handle_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(mode.engine.state().snake.len(), 1);
        assert_eq!(mode.engine.state().score, 0);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char('q'))).unwrap();
        assert!(mode.should_quit);
    }
}
