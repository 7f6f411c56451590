//! Twin Breakout - two-pane Breakout with a mirrored opponent board
//!
//! Core modules:
//! - `sim`: Board state, axis-aligned collision, shared physics pass
//! - `game`: Authoritative local instance and reactive opponent mirror
//! - `net`: Wire protocol, sync channel, session coordinator, peer adapter
//! - `renderer`: Drawing-surface abstraction and scene composition
//! - `platform`: Browser bindings (WebSocket, canvas, keyboard)
//! - `relay`: Room pairing used by the relay server binary

pub mod game;
pub mod input;
pub mod net;
pub mod platform;
pub mod relay;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{LocalGame, MirrorGame};
pub use net::{ConnectionPhase, GameSession, Peer, SyncEvent};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (both panes share them)
    pub const FIELD_WIDTH: f32 = 500.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Paddle defaults
    pub const PADDLE_START_X: f32 = 200.0;
    pub const PADDLE_Y: f32 = 470.0;
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Horizontal distance per tick while a direction key is held
    pub const PADDLE_STEP: f32 = 6.0;

    /// Ball defaults (position is the top-left corner)
    pub const BALL_START_X: f32 = 250.0;
    pub const BALL_START_Y: f32 = 300.0;
    pub const BALL_SIZE: f32 = 10.0;
    pub const BALL_START_DX: f32 = 3.0;
    pub const BALL_START_DY: f32 = -3.0;
    /// Steepest paddle deflection from vertical (60 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Brick grid
    pub const BRICK_ROWS: u32 = 5;
    pub const BRICK_COLS: u32 = 8;
    pub const BRICK_WIDTH: f32 = 50.0;
    pub const BRICK_HEIGHT: f32 = 15.0;
    pub const BRICK_PITCH_X: f32 = 60.0;
    pub const BRICK_PITCH_Y: f32 = 25.0;
    pub const BRICK_MARGIN_X: f32 = 20.0;
    pub const BRICK_MARGIN_Y: f32 = 30.0;

    /// Lives at the start of every round
    pub const START_LIVES: u32 = 3;

    /// Per-axis distance within which an inbound brick position matches a mirror brick
    pub const BRICK_MATCH_TOLERANCE: f32 = 5.0;
}
