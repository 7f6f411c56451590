//! Opponent replica
//!
//! The mirror runs the same physics pass as the local board so the pane
//! looks alive, but that pass is cosmetic: it never emits events and never
//! touches lives or phase. Only inbound sync events move score-relevant
//! state, because two independently simulated boards drift apart.

use glam::Vec2;

use crate::net::protocol::SyncEvent;
use crate::sim::{Board, Phase, advance};

#[derive(Debug, Clone, Default)]
pub struct MirrorGame {
    board: Board,
}

impl MirrorGame {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn lives(&self) -> u32 {
        self.board.lives
    }

    pub fn phase(&self) -> Phase {
        self.board.phase
    }

    pub fn reset(&mut self) {
        self.board.reset();
    }

    /// Cosmetic physics pass. A lost ball just respawns.
    pub fn tick(&mut self) {
        if self.board.phase != Phase::Playing {
            return;
        }
        let outcome = advance(&mut self.board);
        if outcome.fell_through {
            self.board.ball.reset();
        }
    }

    /// Apply one opponent event. Returns true if the replica changed.
    ///
    /// Pairing signals are the session's business and are ignored here.
    pub fn apply(&mut self, event: &SyncEvent) -> bool {
        match *event {
            SyncEvent::PaddleInput { direction } => {
                self.board.phase == Phase::Playing && self.board.paddle.nudge(direction)
            }
            SyncEvent::BrickDestroyed { x, y, id } => self.hit_brick(Vec2::new(x, y), id),
            SyncEvent::LivesUpdate { lives } => {
                let changed = self.board.lives != lives;
                self.board.lives = lives;
                changed
            }
            SyncEvent::GameOver { state } => {
                let phase = Phase::from(state);
                let changed = self.board.phase != phase;
                self.board.phase = phase;
                if changed {
                    log::info!("Opponent finished: {:?}", phase);
                }
                changed
            }
            SyncEvent::OpponentConnected | SyncEvent::OpponentDisconnected => false,
        }
    }

    /// Find the brick by stable id, falling back to position for peers that
    /// don't send one, and apply a single hit.
    fn hit_brick(&mut self, pos: Vec2, id: Option<u32>) -> bool {
        let index = id
            .and_then(|id| self.board.brick_index_by_id(id))
            .or_else(|| self.board.brick_index_at(pos));
        match index {
            Some(index) => {
                self.board.damage_brick(index);
                true
            }
            None => {
                log::debug!("No mirror brick near ({}, {}), ignoring", pos.x, pos.y);
                false
            }
        }
    }
}
