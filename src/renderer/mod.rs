//! 2D scene drawing
//!
//! Each pane is redrawn from scratch every frame onto a [`Surface`]. The
//! scene code decides what goes where; the surface only knows how to paint
//! rectangles, circles, and text.

use glam::Vec2;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::net::{ConnectionPhase, GameSession};
use crate::sim::{Board, Phase, Rect};

/// Drawing backend for one pane
pub trait Surface {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str);
    /// `pos` is the text baseline origin; `font` is a CSS font string
    fn fill_text(&mut self, text: &str, pos: Vec2, font: &str, color: &str);
}

/// Sprite colors for one pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub paddle: &'static str,
    pub ball: &'static str,
    pub life: &'static str,
}

pub const LOCAL_PALETTE: Palette = Palette {
    paddle: "blue",
    ball: "red",
    life: "red",
};

pub const MIRROR_PALETTE: Palette = Palette {
    paddle: "lightblue",
    ball: "pink",
    life: "pink",
};

const LABEL_FONT: &str = "16px Arial";
const LABEL_POS: Vec2 = Vec2::new(10.0, 20.0);
const LIFE_SIZE: f32 = 15.0;
const LIFE_PITCH: f32 = 20.0;
const LIFE_ORIGIN: Vec2 = Vec2::new(10.0, 220.0);

/// A centred message drawn over a pane
#[derive(Debug, Clone, Copy, PartialEq)]
struct Overlay {
    text: &'static str,
    font: &'static str,
    color: &'static str,
    /// Shift left from the pane centre so the text sits roughly centred
    offset: f32,
}

impl Overlay {
    const fn new(text: &'static str, font: &'static str, color: &'static str, offset: f32) -> Self {
        Self {
            text,
            font,
            color,
            offset,
        }
    }

    fn draw(&self, surface: &mut impl Surface) {
        let pos = Vec2::new(FIELD_WIDTH / 2.0 - self.offset, FIELD_HEIGHT / 2.0);
        surface.fill_text(self.text, pos, self.font, self.color);
    }
}

fn local_overlay(session: &GameSession) -> Option<Overlay> {
    match session.connection() {
        ConnectionPhase::Disconnected | ConnectionPhase::Connecting => {
            Some(Overlay::new("Connecting...", "20px Arial", "white", 60.0))
        }
        ConnectionPhase::Waiting => Some(Overlay::new(
            "Waiting for opponent...",
            "20px Arial",
            "white",
            100.0,
        )),
        ConnectionPhase::Paired => match session.local().phase() {
            Phase::GameOver => Some(Overlay::new("You Lost!", "30px Arial", "white", 70.0)),
            Phase::Win => Some(Overlay::new("You Win!", "30px Arial", "white", 70.0)),
            Phase::Waiting | Phase::Playing => None,
        },
    }
}

fn mirror_overlay(session: &GameSession) -> Option<Overlay> {
    if !session.is_paired() {
        return Some(Overlay::new("No opponent", "20px Arial", "gray", 70.0));
    }
    match session.mirror().phase() {
        Phase::GameOver => Some(Overlay::new("Lost", "24px Arial", "white", 30.0)),
        Phase::Win => Some(Overlay::new("Won!", "24px Arial", "white", 30.0)),
        Phase::Waiting | Phase::Playing => None,
    }
}

/// Paddle, ball, bricks, and remaining lives
pub fn draw_board(surface: &mut impl Surface, board: &Board, palette: &Palette) {
    surface.fill_rect(board.paddle.rect(), palette.paddle);
    surface.fill_rect(board.ball.rect(), palette.ball);
    for brick in &board.bricks {
        surface.fill_rect(brick.rect(), brick.tier().color());
    }
    let radius = LIFE_SIZE / 2.0;
    for i in 0..board.lives {
        let corner = LIFE_ORIGIN + Vec2::new(i as f32 * LIFE_PITCH, 0.0);
        surface.fill_circle(corner + Vec2::splat(radius), radius, palette.life);
    }
}

/// The player's own pane. The board is always visible under the overlay.
pub fn draw_local(surface: &mut impl Surface, session: &GameSession) {
    surface.clear();
    draw_board(surface, session.local().board(), &LOCAL_PALETTE);
    if let Some(overlay) = local_overlay(session) {
        overlay.draw(surface);
    }
    surface.fill_text("You", LABEL_POS, LABEL_FONT, "white");
}

/// The opponent pane. Sprites only appear once paired.
pub fn draw_mirror(surface: &mut impl Surface, session: &GameSession) {
    surface.clear();
    if session.is_paired() {
        draw_board(surface, session.mirror().board(), &MIRROR_PALETTE);
    }
    if let Some(overlay) = mirror_overlay(session) {
        overlay.draw(surface);
    }
    surface.fill_text("Opponent", LABEL_POS, LABEL_FONT, "white");
}
