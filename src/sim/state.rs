//! Board state and core simulation types
//!
//! Both the local and the mirror instance own one `Board` each. Nothing in
//! here performs I/O.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Current phase of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Not yet paired, or the opponent left
    #[default]
    Waiting,
    /// Active gameplay
    Playing,
    /// Every brick cleared
    Win,
    /// Out of lives
    #[serde(rename = "gameover")]
    GameOver,
}

impl Phase {
    /// Win and GameOver end the round
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Win | Phase::GameOver)
    }
}

/// Horizontal paddle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// The paddle; only `x` ever changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: PADDLE_START_X,
            y: PADDLE_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Move one step in `direction`, clamped to the field.
    ///
    /// Returns false (and leaves the paddle alone) when it already touches
    /// the wall on that side.
    pub fn nudge(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Left if self.x > 0.0 => {
                self.x = (self.x - PADDLE_STEP).max(0.0);
                true
            }
            Direction::Right if self.x + self.width < FIELD_WIDTH => {
                self.x = (self.x + PADDLE_STEP).min(FIELD_WIDTH - self.width);
                true
            }
            _ => false,
        }
    }
}

/// The ball; `pos` is its top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::new(BALL_START_X, BALL_START_Y),
            vel: Vec2::new(BALL_START_DX, BALL_START_DY),
            size: BALL_SIZE,
        }
    }
}

impl Ball {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Back to the serve position and velocity
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Brick durability tier, doubles as the display colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    pub fn from_hits(hits: u8) -> Self {
        match hits {
            0 | 1 => Tier::Low,
            2 => Tier::Mid,
            _ => Tier::High,
        }
    }

    pub fn hits(&self) -> u8 {
        match self {
            Tier::Low => 1,
            Tier::Mid => 2,
            Tier::High => 3,
        }
    }

    /// Tier assigned to a row of the canonical grid
    pub fn for_row(row: u32) -> Self {
        match row {
            0 => Tier::High,
            1 | 2 => Tier::Mid,
            _ => Tier::Low,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tier::Low => "green",
            Tier::Mid => "yellow",
            Tier::High => "orange",
        }
    }
}

/// A brick entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Stable id (`row * BRICK_COLS + col`), identical on both boards
    pub id: u32,
    pub pos: Vec2,
    pub hits: u8,
}

impl Brick {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, BRICK_WIDTH, BRICK_HEIGHT)
    }

    pub fn tier(&self) -> Tier {
        Tier::from_hits(self.hits)
    }

    /// Take one hit. Returns true once the brick is spent.
    pub fn hit(&mut self) -> bool {
        self.hits = self.hits.saturating_sub(1);
        self.hits == 0
    }

    /// True when `pos` lies within the match tolerance on both axes
    pub fn matches_position(&self, pos: Vec2) -> bool {
        (self.pos.x - pos.x).abs() <= BRICK_MATCH_TOLERANCE
            && (self.pos.y - pos.y).abs() <= BRICK_MATCH_TOLERANCE
    }
}

/// The 5x8 starting grid, ids in row-major order
pub fn canonical_bricks() -> Vec<Brick> {
    let mut bricks = Vec::with_capacity((BRICK_ROWS * BRICK_COLS) as usize);
    for row in 0..BRICK_ROWS {
        for col in 0..BRICK_COLS {
            bricks.push(Brick {
                id: row * BRICK_COLS + col,
                pos: Vec2::new(
                    col as f32 * BRICK_PITCH_X + BRICK_MARGIN_X,
                    row as f32 * BRICK_PITCH_Y + BRICK_MARGIN_Y,
                ),
                hits: Tier::for_row(row).hits(),
            });
        }
    }
    bricks
}

/// Complete state of one pane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub lives: u32,
    pub phase: Phase,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Live bricks, sorted by id
    pub bricks: Vec<Brick>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Fresh board in the waiting phase
    pub fn new() -> Self {
        Self {
            lives: START_LIVES,
            phase: Phase::Waiting,
            paddle: Paddle::default(),
            ball: Ball::default(),
            bricks: canonical_bricks(),
        }
    }

    /// Start a new round: full lives, serve position, regenerated grid
    pub fn reset(&mut self) {
        *self = Self {
            phase: Phase::Playing,
            ..Self::new()
        };
    }

    pub fn brick_index_by_id(&self, id: u32) -> Option<usize> {
        self.bricks.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn brick_index_at(&self, pos: Vec2) -> Option<usize> {
        self.bricks.iter().position(|b| b.matches_position(pos))
    }

    /// Apply one hit to the brick at `index`, removing it when spent.
    /// Returns true if the brick was removed.
    pub fn damage_brick(&mut self, index: usize) -> bool {
        let Some(brick) = self.bricks.get_mut(index) else {
            return false;
        };
        if brick.hit() {
            self.bricks.remove(index);
            true
        } else {
            false
        }
    }
}
