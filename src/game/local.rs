//! Authoritative local board

use crate::net::protocol::{Outcome, SyncEvent};
use crate::sim::{Board, Phase, TickInput, advance};

/// This player's board. Owns lives and phase; every change the opponent
/// needs to know about comes out of [`LocalGame::tick`] as a [`SyncEvent`].
#[derive(Debug, Clone, Default)]
pub struct LocalGame {
    board: Board,
}

impl LocalGame {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
        }
    }

    /// Resume from an arbitrary board, e.g. a scripted position
    pub fn from_board(board: Board) -> Self {
        Self { board }
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

    pub fn set_phase(&mut self, phase: Phase) {
        self.board.phase = phase;
    }

    /// Start a fresh round in the playing phase
    pub fn reset(&mut self) {
        self.board.reset();
    }

    /// Advance one frame and return the events to send, in order.
    ///
    /// Does nothing outside the playing phase.
    pub fn tick(&mut self, input: &TickInput) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        if self.board.phase != Phase::Playing {
            return events;
        }

        // Held keys emit every frame, not only on press
        for direction in input.directions() {
            if self.board.paddle.nudge(direction) {
                events.push(SyncEvent::PaddleInput { direction });
            }
        }

        let outcome = advance(&mut self.board);

        // Every hit is reported; the mirror tells removal from recolour itself
        events.extend(outcome.brick_hits.iter().map(|hit| SyncEvent::BrickDestroyed {
            x: hit.pos.x,
            y: hit.pos.y,
            id: Some(hit.id),
        }));

        if self.board.bricks.is_empty() {
            self.board.phase = Phase::Win;
            log::info!("All bricks cleared");
            events.push(SyncEvent::GameOver {
                state: Outcome::Win,
            });
            return events;
        }

        if outcome.fell_through {
            self.board.ball.reset();
            self.board.lives = self.board.lives.saturating_sub(1);
            log::debug!("Ball lost, {} lives left", self.board.lives);
            events.push(SyncEvent::LivesUpdate {
                lives: self.board.lives,
            });

            if self.board.lives == 0 {
                self.board.phase = Phase::GameOver;
                log::info!("Out of lives");
                events.push(SyncEvent::GameOver {
                    state: Outcome::GameOver,
                });
            }
        }

        events
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
