//! Collision detection and response for axis-aligned boxes
//!
//! Every sprite on a board is a rectangle, so overlap is a plain
//! separating-axis test. Paddle bounces rewrite the velocity from the hit
//! offset instead of mirroring it.

use glam::Vec2;

use crate::consts::{FIELD_WIDTH, MAX_BOUNCE_ANGLE};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Reflect off the side and top walls.
///
/// The sign is forced toward the field interior so a ball that overshoots a
/// wall cannot flip back and forth while still outside it.
pub fn reflect_off_walls(pos: Vec2, size: f32, vel: Vec2) -> Vec2 {
    let mut vel = vel;
    if pos.x <= 0.0 {
        vel.x = vel.x.abs();
    } else if pos.x + size >= FIELD_WIDTH {
        vel.x = -vel.x.abs();
    }
    if pos.y <= 0.0 {
        vel.y = vel.y.abs();
    }
    vel
}

/// Velocity after a paddle hit.
///
/// The offset of the ball centre from the paddle centre, normalised to the
/// paddle half-width, picks an angle in `[-MAX_BOUNCE_ANGLE, MAX_BOUNCE_ANGLE]`
/// from vertical. Speed is preserved and the ball always leaves upward.
pub fn paddle_bounce(ball_center_x: f32, paddle_center_x: f32, half_width: f32, vel: Vec2) -> Vec2 {
    let hit_offset = ((ball_center_x - paddle_center_x) / half_width).clamp(-1.0, 1.0);
    let angle = hit_offset * MAX_BOUNCE_ANGLE;
    let speed = vel.length();
    Vec2::new(speed * angle.sin(), -(speed * angle.cos()).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(30.0, 30.0, 1.0, 1.0)));
    }

    #[test]
    fn test_wall_reflection() {
        let vel = Vec2::new(-3.0, -3.0);
        let out = reflect_off_walls(Vec2::new(-1.0, 100.0), 10.0, vel);
        assert_eq!(out, Vec2::new(3.0, -3.0));

        let out = reflect_off_walls(Vec2::new(100.0, -0.5), 10.0, vel);
        assert_eq!(out, Vec2::new(-3.0, 3.0));

        let out = reflect_off_walls(Vec2::new(491.0, 100.0), 10.0, Vec2::new(3.0, 3.0));
        assert_eq!(out, Vec2::new(-3.0, 3.0));

        // Already heading inward: untouched
        let out = reflect_off_walls(Vec2::new(-1.0, 100.0), 10.0, Vec2::new(3.0, 3.0));
        assert_eq!(out, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_center_hit_goes_straight_up() {
        let vel = paddle_bounce(250.0, 250.0, 50.0, Vec2::new(3.0, 3.0));
        assert!(vel.x.abs() < 1e-5);
        assert!((vel.y + 18.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_edge_hit_is_capped_at_max_angle() {
        // Past the edge still clamps to 60 degrees
        let vel = paddle_bounce(320.0, 250.0, 50.0, Vec2::new(0.0, 4.0));
        let angle = vel.x.atan2(-vel.y);
        assert!((angle - MAX_BOUNCE_ANGLE).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_paddle_bounce_conserves_speed(
            offset in -70.0f32..70.0,
            dx in -8.0f32..8.0,
            dy in -8.0f32..8.0,
        ) {
            let vel = Vec2::new(dx, dy);
            let out = paddle_bounce(250.0 + offset, 250.0, 50.0, vel);
            prop_assert!((out.length() - vel.length()).abs() < 1e-3);
            prop_assert!(out.y <= 0.0);
        }
    }
}
