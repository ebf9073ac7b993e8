use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::grid::Grid;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction (unwrapped)
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Top-left pixel corner of this cell
    pub fn to_pixels(&self, cell_size: u32) -> (i64, i64) {
        let size = i64::from(cell_size);
        (i64::from(self.x) * size, i64::from(self.y) * size)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Occupied cells, head at index 0
    body: Vec<Position>,
    /// Segment count the tail is trimmed down to; never below 1
    length: usize,
    direction: Direction,
    pending_direction: Option<Direction>,
    /// Cells vacated by the most recent move
    trimmed: Vec<Position>,
}

impl Snake {
    /// A single-segment snake facing right
    pub fn new(start: Position) -> Self {
        Self {
            body: vec![start],
            length: 1,
            direction: Direction::Right,
            pending_direction: None,
            trimmed: Vec::new(),
        }
    }

    /// A snake with an explicit body; the target length matches the body
    ///
    /// Returns `None` for an empty body.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Self {
            length: body.len(),
            body,
            direction,
            pending_direction: None,
            trimmed: Vec::new(),
        })
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// All segments, head first
    pub fn segments(&self) -> &[Position] {
        &self.body
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    pub fn trimmed(&self) -> &[Position] {
        &self.trimmed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    /// Target segment count
    pub fn length(&self) -> usize {
        self.length
    }

    /// Segments currently on the grid
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Buffer a turn for the next tick.
    ///
    /// The reverse of the committed direction is dropped; otherwise the
    /// request replaces whatever was buffered before. Returns whether the
    /// request was accepted.
    pub fn buffer_direction(&mut self, requested: Direction) -> bool {
        if self.direction.is_opposite(requested) {
            return false;
        }
        self.pending_direction = Some(requested);
        true
    }

    pub fn commit_direction(&mut self) {
        if let Some(direction) = self.pending_direction.take() {
            self.direction = direction;
        }
    }

    /// Step the head one cell forward and trim the tail down to `length`
    pub fn advance(&mut self, grid: &Grid) {
        self.trimmed.clear();
        let new_head = grid.neighbor(self.head(), self.direction);
        self.body.insert(0, new_head);

        while self.body.len() > self.length {
            if let Some(tail) = self.body.pop() {
                self.trimmed.push(tail);
            }
        }
    }

    /// Grow or shrink the target length, clamped at 1
    pub fn change_length(&mut self, delta: i32) {
        let length = self.length as i64 + i64::from(delta);
        self.length = length.max(1) as usize;
    }

    pub fn collides_with(&self, item: &Item) -> bool {
        self.head() == item.position
    }

    pub fn collides_with_self(&self) -> bool {
        self.body_segments().contains(&self.head())
    }

    /// Back to a single segment at `start`, facing right.
    ///
    /// The discarded body is appended to `trimmed` so it can be erased.
    pub fn reset(&mut self, start: Position) {
        self.trimmed.append(&mut self.body);
        self.body.push(start);
        self.length = 1;
        self.direction = Direction::Right;
        self.pending_direction = None;
    }
}

/// Effect class of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Apple: grows the snake by one
    Growth,
    /// Poison: shrinks the snake by one
    Shrink,
    /// Rock: resets the snake
    Lethal,
}

/// Outline a renderer draws an item with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Square,
    Triangle,
}

impl ItemKind {
    pub fn shape(&self) -> Shape {
        match self {
            ItemKind::Growth | ItemKind::Lethal => Shape::Square,
            ItemKind::Shrink => Shape::Triangle,
        }
    }

    /// Length change applied when the head lands on the item
    pub fn length_delta(&self) -> i32 {
        match self {
            ItemKind::Growth => 1,
            ItemKind::Shrink => -1,
            ItemKind::Lethal => 0,
        }
    }
}

/// A positioned, classified entity on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub position: Position,
}

impl Item {
    pub fn new(kind: ItemKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn shape(&self) -> Shape {
        self.kind.shape()
    }
}

/// Everything the engine mutates during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub growth: Item,
    pub shrink: Item,
    pub obstacle: Item,
    /// Growth items eaten in the current episode
    pub score: u32,
    pub steps: u64,
    pub resets: u32,
}

impl GameState {
    pub fn new(snake: Snake, growth: Position, shrink: Position, obstacle: Position) -> Self {
        Self {
            snake,
            growth: Item::new(ItemKind::Growth, growth),
            shrink: Item::new(ItemKind::Shrink, shrink),
            obstacle: Item::new(ItemKind::Lethal, obstacle),
            score: 0,
            steps: 0,
            resets: 0,
        }
    }

    pub fn items(&self) -> [Item; 3] {
        [self.growth, self.shrink, self.obstacle]
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            segments: self.snake.segments().to_vec(),
            trimmed: self.snake.trimmed().to_vec(),
            items: self.items().to_vec(),
            length: self.snake.length(),
            direction: self.snake.direction(),
            score: self.score,
            steps: self.steps,
            resets: self.resets,
        }
    }
}

/// Read-only view handed to a renderer after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snake cells, head first
    pub segments: Vec<Position>,
    /// Cells vacated this tick
    pub trimmed: Vec<Position>,
    pub items: Vec<Item>,
    pub length: usize,
    pub direction: Direction,
    pub score: u32,
    pub steps: u64,
    pub resets: u32,
}

impl Snapshot {
    pub fn head(&self) -> Option<Position> {
        self.segments.first().copied()
    }

    /// Item drawn at `pos`, if any; later kinds win when items overlap
    pub fn item_at(&self, pos: Position) -> Option<&Item> {
        self.items.iter().rev().find(|item| item.position == pos)
    }
}
