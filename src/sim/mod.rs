//! Board simulation
//!
//! Pure physics and state shared by both panes:
//! - Stable iteration order (bricks sorted by id)
//! - No rendering, input, or network dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, paddle_bounce, reflect_off_walls};
pub use state::{Ball, Board, Brick, Direction, Paddle, Phase, Tier, canonical_bricks};
pub use tick::{BrickHit, StepOutcome, TickInput, advance};
