//! Per-frame physics pass
//!
//! Ball motion, wall and paddle bounces, and brick hits are identical for the
//! authoritative board and the mirror. What differs is what each instance
//! does with the [`StepOutcome`]: the local game turns it into sync events
//! and life loss, the mirror only resets its ball.

use glam::Vec2;

use super::collision::{paddle_bounce, reflect_off_walls};
use super::state::{Board, Direction};
use crate::consts::FIELD_HEIGHT;

/// Held direction keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    /// Directions to apply this tick, left first
    pub fn directions(&self) -> impl Iterator<Item = Direction> {
        [
            self.left.then_some(Direction::Left),
            self.right.then_some(Direction::Right),
        ]
        .into_iter()
        .flatten()
    }
}

/// A brick struck during a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickHit {
    pub id: u32,
    /// Brick position at the time of the hit
    pub pos: Vec2,
    /// The hit used up the brick's last point
    pub removed: bool,
}

/// What a single pass did to the board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub paddle_bounce: bool,
    /// Bricks hit this pass, in grid order
    pub brick_hits: Vec<BrickHit>,
    /// The ball dropped below the field; the caller decides what that costs
    pub fell_through: bool,
}

/// Advance the ball one frame and resolve collisions.
///
/// The ball moves by its full velocity, reflects off the side and top walls,
/// bounces off the paddle, then damages every brick it overlaps. `dy` flips
/// once per pass no matter how many bricks were struck.
pub fn advance(board: &mut Board) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let ball = &mut board.ball;

    ball.pos += ball.vel;
    ball.vel = reflect_off_walls(ball.pos, ball.size, ball.vel);

    let paddle = &board.paddle;
    if ball.rect().overlaps(&paddle.rect()) {
        ball.vel = paddle_bounce(
            ball.center().x,
            paddle.center_x(),
            paddle.width / 2.0,
            ball.vel,
        );
        // Lift the ball clear so it cannot sink into the paddle
        ball.pos.y = paddle.y - ball.size - 1.0;
        outcome.paddle_bounce = true;
    }

    let ball_rect = ball.rect();
    let struck: Vec<usize> = board
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, brick)| brick.rect().overlaps(&ball_rect))
        .map(|(idx, _)| idx)
        .collect();

    if !struck.is_empty() {
        board.ball.vel.y = -board.ball.vel.y;
    }

    // Walk backwards so removals don't shift indices still to be visited
    for &idx in struck.iter().rev() {
        let brick = &board.bricks[idx];
        let (id, pos) = (brick.id, brick.pos);
        let removed = board.damage_brick(idx);
        outcome.brick_hits.push(BrickHit { id, pos, removed });
    }
    outcome.brick_hits.reverse();

    outcome.fell_through = board.ball.pos.y > FIELD_HEIGHT;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{Ball, Phase};
    use proptest::prelude::*;

    fn playing_board() -> Board {
        let mut board = Board::new();
        board.reset();
        board
    }

    #[test]
    fn test_first_pass_moves_ball() {
        let mut board = playing_board();
        let outcome = advance(&mut board);
        assert_eq!(board.ball.pos, Vec2::new(253.0, 297.0));
        assert_eq!(outcome, StepOutcome::default());
        assert_eq!(board.phase, Phase::Playing);
    }

    #[test]
    fn test_paddle_bounce_repositions_ball() {
        let mut board = playing_board();
        board.ball.pos = Vec2::new(245.0, 462.0);
        board.ball.vel = Vec2::new(0.0, 4.0);

        let outcome = advance(&mut board);
        assert!(outcome.paddle_bounce);
        assert_eq!(board.ball.pos.y, PADDLE_Y - BALL_SIZE - 1.0);
        assert!(board.ball.vel.y < 0.0);
        assert!((board.ball.speed() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_brick_hit_reflects_and_damages() {
        let mut board = playing_board();
        // Just under brick 32 (row 4, col 0: x=20, y=130)
        board.ball.pos = Vec2::new(30.0, 148.0);
        board.ball.vel = Vec2::new(0.0, -4.0);

        let outcome = advance(&mut board);
        assert_eq!(outcome.brick_hits.len(), 1);
        let hit = outcome.brick_hits[0];
        assert_eq!(hit.id, 32);
        assert_eq!(hit.pos, Vec2::new(20.0, 130.0));
        assert!(hit.removed);
        assert_eq!(board.ball.vel.y, 4.0);
        assert_eq!(board.bricks.len(), 39);
        assert!(board.brick_index_by_id(32).is_none());
    }

    #[test]
    fn test_straddling_two_bricks_flips_once() {
        let mut board = playing_board();
        // Gap between bricks 32 and 33 is x in [70, 80]; straddle it
        board.ball.pos = Vec2::new(66.0, 148.0);
        board.ball.vel = Vec2::new(0.0, -4.0);
        // Widen ball to reach both
        board.ball.size = 20.0;

        let outcome = advance(&mut board);
        let ids: Vec<u32> = outcome.brick_hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![32, 33]);
        assert_eq!(board.ball.vel.y, 4.0);
        assert_eq!(board.bricks.len(), 38);
    }

    #[test]
    fn test_fall_through_reported() {
        let mut board = playing_board();
        board.ball.pos = Vec2::new(10.0, 498.0);
        board.ball.vel = Vec2::new(0.0, 3.0);
        let outcome = advance(&mut board);
        assert!(outcome.fell_through);
        // The pass itself never touches lives
        assert_eq!(board.lives, START_LIVES);
    }

    #[test]
    fn test_tick_input_directions() {
        let both = TickInput { left: true, right: true };
        assert_eq!(
            both.directions().collect::<Vec<_>>(),
            vec![Direction::Left, Direction::Right]
        );
        assert_eq!(TickInput::default().directions().count(), 0);
    }

    proptest! {
        /// Brick hit counts never increase and spent bricks never linger
        #[test]
        fn prop_bricks_only_wear_down(
            x in 0.0f32..490.0,
            y in 0.0f32..460.0,
            dx in -6.0f32..6.0,
            dy in -6.0f32..6.0,
            ticks in 1usize..300,
        ) {
            let mut board = playing_board();
            board.ball = Ball { pos: Vec2::new(x, y), vel: Vec2::new(dx, dy), ..Ball::default() };
            let mut last: std::collections::BTreeMap<u32, u8> =
                board.bricks.iter().map(|b| (b.id, b.hits)).collect();

            for _ in 0..ticks {
                let outcome = advance(&mut board);
                if outcome.fell_through {
                    board.ball.reset();
                }
                for brick in &board.bricks {
                    prop_assert!(brick.hits > 0);
                    let before = last.get(&brick.id).copied();
                    prop_assert!(before.is_some_and(|b| brick.hits <= b));
                }
                for hit in &outcome.brick_hits {
                    if hit.removed {
                        prop_assert!(board.brick_index_by_id(hit.id).is_none());
                    }
                }
                last = board.bricks.iter().map(|b| (b.id, b.hits)).collect();
            }
        }
    }
}
