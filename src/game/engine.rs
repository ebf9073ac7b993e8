use log::{debug, info, trace};
use std::collections::HashSet;

use super::{
    action::Direction,
    config::{EffectResolution, GameConfig, ResetPlacement},
    error::GameError,
    grid::Grid,
    spawner::Spawner,
    state::{GameState, Position, Snake, Snapshot},
};

/// Type of collision that ended an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake ran into its own body
    SelfCollision,
    /// Snake ran into the lethal obstacle
    Obstacle,
}

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    pub ate_growth: bool,
    pub ate_shrink: bool,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
}

/// Fired when the snake resets, closing an episode
#[derive(Debug, Clone, PartialEq)]
pub struct ResetEvent {
    pub cause: CollisionType,
    /// Target length reached before the collision
    pub length: usize,
    /// Ticks survived in the episode
    pub steps: u64,
    pub score: u32,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub info: StepInfo,
    pub reset: Option<ResetEvent>,
}

/// Owns the grid, the entities and the RNG, and advances them one tick at a time
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    spawner: Spawner,
    state: GameState,
    /// Tick at which the current episode started
    episode_start: u64,
}

impl GameEngine {
    /// Create a new game engine with the snake at the center cell
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let grid = Grid::from_config(&config);
        let mut spawner = match config.seed {
            Some(seed) => Spawner::new(grid, seed, config.max_spawn_attempts),
            None => Spawner::from_random(grid, config.max_spawn_attempts),
        };

        let snake = Snake::new(grid.center());
        let occupied: HashSet<Position> = snake.segments().iter().copied().collect();
        let growth = spawner.place(&occupied)?;
        let shrink = spawner.place(&occupied)?;
        let obstacle = spawner.place(&occupied)?;

        info!(
            "Engine started on a {}x{} grid (seed {})",
            grid.width(),
            grid.height(),
            spawner.seed()
        );

        Ok(Self {
            config,
            grid,
            spawner,
            state: GameState::new(snake, growth, shrink, obstacle),
            episode_start: 0,
        })
    }

    /// Create an engine around an existing state
    pub fn with_state(config: GameConfig, state: GameState) -> Result<Self, GameError> {
        let mut engine = Self::new(config)?;
        engine.episode_start = state.steps;
        engine.state = state;
        Ok(engine)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Queue a turn for the next tick; see [`Snake::buffer_direction`]
    pub fn buffer_direction(&mut self, direction: Direction) -> bool {
        self.state.snake.buffer_direction(direction)
    }

    /// Execute one step of the game
    pub fn step(&mut self) -> Result<StepResult, GameError> {
        let snake = &mut self.state.snake;
        snake.commit_direction();
        snake.advance(&self.grid);
        self.state.steps += 1;
        trace!(
            "tick {}: head {:?} length {}",
            self.state.steps,
            self.state.snake.head(),
            self.state.snake.length()
        );

        let exclusive = self.config.effect_resolution == EffectResolution::Exclusive;
        let mut info = StepInfo::default();

        // Placements run before any effect is applied so a failed spawn leaves the tally intact
        if self.state.snake.collides_with(&self.state.growth) {
            let respawn = self.place_avoiding_snake()?;
            info.ate_growth = true;
            self.state.snake.change_length(self.state.growth.kind.length_delta());
            self.state.score += 1;
            self.state.growth.position = respawn;
            debug!(
                "Growth eaten, length now {}; respawned at {:?}",
                self.state.snake.length(),
                self.state.growth.position
            );
        }

        if !(exclusive && info.ate_growth) && self.state.snake.collides_with(&self.state.shrink) {
            let respawn = if self.config.respawn_shrink_item {
                Some(self.place_avoiding_snake()?)
            } else {
                None
            };
            info.ate_shrink = true;
            self.state.snake.change_length(self.state.shrink.kind.length_delta());
            if let Some(position) = respawn {
                self.state.shrink.position = position;
            }
            debug!("Shrink eaten, length now {}", self.state.snake.length());
        }

        if !(exclusive && (info.ate_growth || info.ate_shrink)) {
            info.collision = if self.state.snake.collides_with_self() {
                Some(CollisionType::SelfCollision)
            } else if self.state.snake.collides_with(&self.state.obstacle) {
                Some(CollisionType::Obstacle)
            } else {
                None
            };
        }

        let reset = match info.collision {
            Some(cause) => Some(self.reset_episode(cause)?),
            None => None,
        };

        Ok(StepResult { info, reset })
    }

    /// Reset the snake without a collision, e.g. on player request
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.respawn_snake()?;
        info!("Episode restarted at tick {}", self.state.steps);
        Ok(())
    }

    fn reset_episode(&mut self, cause: CollisionType) -> Result<ResetEvent, GameError> {
        let event = ResetEvent {
            cause,
            length: self.state.snake.length(),
            steps: self.state.steps - self.episode_start,
            score: self.state.score,
        };
        self.respawn_snake()?;
        self.state.resets += 1;
        info!(
            "Snake reset after {:?}: length {}, {} ticks, score {}",
            event.cause, event.length, event.steps, event.score
        );
        Ok(event)
    }

    fn respawn_snake(&mut self) -> Result<(), GameError> {
        let start = match self.config.reset_placement {
            ResetPlacement::Center => self.grid.center(),
            ResetPlacement::Random => self.spawner.random_cell(),
        };
        let occupied = HashSet::from([start]);
        let growth = self.spawner.place(&occupied)?;
        let obstacle = if self.config.relocate_obstacle_on_reset {
            Some(self.spawner.place(&occupied)?)
        } else {
            None
        };

        self.state.snake.reset(start);
        self.state.score = 0;
        self.episode_start = self.state.steps;
        self.state.growth.position = growth;
        if let Some(position) = obstacle {
            self.state.obstacle.position = position;
        }
        Ok(())
    }

    fn place_avoiding_snake(&mut self) -> Result<Position, GameError> {
        let occupied: HashSet<Position> = self.state.snake.segments().iter().copied().collect();
        self.spawner.place(&occupied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::ItemKind;

    fn config() -> GameConfig {
        GameConfig::default().seeded(2024)
    }

    /// Engine with the snake at (16, 12) and items parked far away
    fn engine_with(config: GameConfig, snake: Snake) -> GameEngine {
        let state = GameState::new(
            snake,
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
        );
        GameEngine::with_state(config, state).unwrap()
    }

    fn center_snake() -> Snake {
        Snake::new(Position::new(16, 12))
    }

    #[test]
    fn test_new_engine() {
        let engine = GameEngine::new(config()).unwrap();
        let state = engine.state();

        assert_eq!(state.snake.segments(), &[Position::new(16, 12)]);
        assert_eq!(state.snake.direction(), Direction::Right);
        assert_eq!(state.steps, 0);
        for item in state.items() {
            assert!(!state.is_occupied_by_snake(item.position));
            assert!(engine.grid().contains(item.position));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = config();
        config.cell_size = 0;
        assert!(GameEngine::new(config).is_err());
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine_with(config(), center_snake());
        let result = engine.step().unwrap();

        assert_eq!(result.info, StepInfo::default());
        assert!(result.reset.is_none());
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.segments, vec![Position::new(17, 12)]);
        assert_eq!(snapshot.trimmed, vec![Position::new(16, 12)]);
        assert_eq!(snapshot.steps, 1);
    }

    #[test]
    fn test_growth_consumption() {
        let mut engine = engine_with(config(), center_snake());
        engine.state.growth.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_growth);
        assert_eq!(engine.state().snake.length(), 2);
        assert_eq!(engine.state().score, 1);
        let growth = engine.state().growth.position;
        assert!(!engine.state().snake.segments().contains(&growth));

        engine.step().unwrap();
        assert_eq!(engine.state().snake.len(), 2);
    }

    #[test]
    fn test_wraps_around_right_edge() {
        let mut engine = engine_with(config(), Snake::new(Position::new(31, 5)));
        engine.step().unwrap();
        assert_eq!(engine.state().snake.head(), Position::new(0, 5));
    }

    #[test]
    fn test_buffered_turn_applies_next_tick() {
        let mut engine = engine_with(config(), center_snake());
        assert!(engine.buffer_direction(Direction::Down));
        assert!(!engine.buffer_direction(Direction::Left));
        engine.step().unwrap();

        assert_eq!(engine.state().snake.direction(), Direction::Down);
        assert_eq!(engine.state().snake.head(), Position::new(16, 13));
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = engine_with(config(), center_snake());
        assert!(!engine.buffer_direction(Direction::Left));
        engine.step().unwrap();

        assert_eq!(engine.state().snake.direction(), Direction::Right);
        assert_eq!(engine.state().snake.head(), Position::new(17, 12));
    }

    #[test]
    fn test_shrink_consumption_respawns() {
        let body = vec![Position::new(16, 12), Position::new(15, 12), Position::new(14, 12)];
        let snake = Snake::from_segments(body, Direction::Right).unwrap();
        let mut engine = engine_with(config(), snake);
        engine.state.shrink.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_shrink);
        assert_eq!(engine.state().snake.length(), 2);
        assert_ne!(engine.state().shrink.position, Position::new(17, 12));
        engine.step().unwrap();
        assert_eq!(engine.state().snake.len(), 2);
    }

    #[test]
    fn test_shrink_stays_put_when_respawn_disabled() {
        let mut config = config();
        config.respawn_shrink_item = false;
        let mut engine = engine_with(config, center_snake());
        engine.state.shrink.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_shrink);
        assert_eq!(engine.state().snake.length(), 1);
        assert_eq!(engine.state().shrink.position, Position::new(17, 12));
    }

    #[test]
    fn test_obstacle_collision_resets() {
        let body = vec![Position::new(16, 12), Position::new(15, 12)];
        let snake = Snake::from_segments(body, Direction::Right).unwrap();
        let mut engine = engine_with(config(), snake);
        engine.state.obstacle.position = Position::new(17, 12);
        engine.state.score = 4;

        let result = engine.step().unwrap();

        assert_eq!(result.info.collision, Some(CollisionType::Obstacle));
        let event = result.reset.unwrap();
        assert_eq!(event.cause, CollisionType::Obstacle);
        assert_eq!(event.length, 2);
        assert_eq!(event.steps, 1);
        assert_eq!(event.score, 4);

        let state = engine.state();
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.length(), 1);
        assert_eq!(state.snake.direction(), Direction::Right);
        assert_eq!(state.resets, 1);
        assert_eq!(state.score, 0);
        assert!(!state.is_occupied_by_snake(state.growth.position));
        assert!(!state.is_occupied_by_snake(state.obstacle.position));
        assert!(state.snake.trimmed().contains(&Position::new(17, 12)));
    }

    #[test]
    fn test_obstacle_fixed_when_relocation_disabled() {
        let mut config = config();
        config.relocate_obstacle_on_reset = false;
        config.reset_placement = ResetPlacement::Center;
        let mut engine = engine_with(config, Snake::new(Position::new(4, 4)));
        engine.state.obstacle.position = Position::new(5, 4);

        let result = engine.step().unwrap();

        assert!(result.reset.is_some());
        assert_eq!(engine.state().obstacle.position, Position::new(5, 4));
        assert_eq!(engine.state().snake.head(), Position::new(16, 12));
    }

    #[test]
    fn test_self_collision() {
        // Square loop: moving down from (5,5) lands on the segment at (5,6)
        let body = vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
            Position::new(4, 6),
        ];
        let snake = Snake::from_segments(body, Direction::Left).unwrap();
        let mut engine = engine_with(config(), snake);
        engine.buffer_direction(Direction::Down);

        let result = engine.step().unwrap();

        assert_eq!(result.info.collision, Some(CollisionType::SelfCollision));
        assert_eq!(result.reset.map(|event| event.length), Some(5));
        assert_eq!(engine.state().snake.len(), 1);
    }

    #[test]
    fn test_center_reset_placement() {
        let mut config = config();
        config.reset_placement = ResetPlacement::Center;
        let mut engine = engine_with(config, Snake::new(Position::new(3, 3)));
        engine.state.obstacle.position = Position::new(4, 3);

        engine.step().unwrap();
        assert_eq!(engine.state().snake.segments(), &[Position::new(16, 12)]);
    }

    #[test]
    fn test_independent_effects_same_tick() {
        // Growth and obstacle share the cell the head enters
        let mut engine = engine_with(config(), center_snake());
        engine.state.growth.position = Position::new(17, 12);
        engine.state.shrink.position = Position::new(17, 12);
        engine.state.obstacle.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_growth);
        assert!(result.info.ate_shrink);
        assert_eq!(result.info.collision, Some(CollisionType::Obstacle));
        assert_eq!(result.reset.map(|event| event.length), Some(1));
    }

    #[test]
    fn test_exclusive_effects_same_tick() {
        let mut config = config();
        config.effect_resolution = EffectResolution::Exclusive;
        let mut engine = engine_with(config, center_snake());
        engine.state.growth.position = Position::new(17, 12);
        engine.state.shrink.position = Position::new(17, 12);
        engine.state.obstacle.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_growth);
        assert!(!result.info.ate_shrink);
        assert_eq!(result.info.collision, None);
        assert!(result.reset.is_none());
        assert_eq!(engine.state().snake.length(), 2);
    }

    #[test]
    fn test_exclusive_shrink_blocks_lethal() {
        let mut config = config();
        config.effect_resolution = EffectResolution::Exclusive;
        let mut engine = engine_with(config, center_snake());
        engine.state.shrink.position = Position::new(17, 12);
        engine.state.obstacle.position = Position::new(17, 12);

        let result = engine.step().unwrap();

        assert!(result.info.ate_shrink);
        assert!(result.reset.is_none());
    }

    #[test]
    fn test_restart() {
        let mut config = config();
        config.reset_placement = ResetPlacement::Center;
        let body = vec![Position::new(2, 2), Position::new(1, 2)];
        let mut engine = engine_with(config, Snake::from_segments(body, Direction::Up).unwrap());

        engine.restart().unwrap();

        assert_eq!(engine.state().snake.segments(), &[Position::new(16, 12)]);
        assert_eq!(engine.state().resets, 0);
    }

    #[test]
    fn test_snapshot_lists_every_item() {
        let engine = engine_with(config(), center_snake());
        let kinds: Vec<_> = engine.snapshot().items.iter().map(|item| item.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Growth, ItemKind::Shrink, ItemKind::Lethal]);
    }

    #[test]
    fn test_spawn_exhausted_surfaces() {
        // 2x1 grid: growing into both cells leaves nowhere for the apple
        let mut config = GameConfig::new(2, 1).seeded(1);
        config.max_spawn_attempts = 4;
        let body = vec![Position::new(0, 0)];
        let snake = Snake::from_segments(body, Direction::Right).unwrap();
        let state = GameState::new(
            snake,
            Position::new(1, 0),
            Position::new(0, 0),
            Position::new(0, 0),
        );
        let mut engine = GameEngine::with_state(config, state).unwrap();
        engine.state.snake.change_length(1);

        assert!(matches!(
            engine.step(),
            Err(GameError::SpawnExhausted { cells: 2, .. })
        ));
    }

    #[test]
    fn test_failed_respawn_leaves_effects_unapplied() {
        let mut config = GameConfig::new(2, 1).seeded(1);
        config.max_spawn_attempts = 4;
        let body = vec![Position::new(0, 0)];
        let snake = Snake::from_segments(body, Direction::Right).unwrap();
        let state = GameState::new(
            snake,
            Position::new(1, 0),
            Position::new(0, 0),
            Position::new(0, 0),
        );
        let mut engine = GameEngine::with_state(config, state).unwrap();
        engine.state.snake.change_length(1);

        assert!(engine.step().is_err());

        let state = engine.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.length(), 2);
        assert_eq!(state.growth.position, Position::new(1, 0));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut engine = GameEngine::new(config()).unwrap();
            let mut snapshots = Vec::new();
            for turn in [Direction::Up, Direction::Left, Direction::Down, Direction::Right]
                .into_iter()
                .cycle()
                .take(200)
            {
                engine.buffer_direction(turn);
                engine.step().unwrap();
                snapshots.push(engine.snapshot());
            }
            snapshots
        };
        assert_eq!(run(), run());
    }
}
