//! Session coordinator
//!
//! Tracks the connection/pairing state machine and gates both panes on it:
//!
//! ```text
//! Disconnected --connect--> Connecting --open--> Waiting --opponentConnected--> Paired
//!                                                   ^                             |
//!                                                   +----opponentDisconnected-----+
//! any --closed--> Disconnected
//! ```
//!
//! Only a paired session simulates. Pairing resets both boards.

use super::protocol::SyncEvent;
use crate::game::{LocalGame, MirrorGame};
use crate::sim::{Phase, TickInput};

/// Where the session is in the pairing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    /// Connected to the relay, no opponent yet
    Waiting,
    Paired,
}

/// Notification delivered to subscribers whenever a phase moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    Connection(ConnectionPhase),
    Local(Phase),
    Mirror(Phase),
}

type Observer = Box<dyn FnMut(PhaseChange)>;

/// One paired 1v1 session: the local board, the opponent mirror, and the
/// connection state that decides whether either of them runs.
#[derive(Default)]
pub struct GameSession {
    connection: ConnectionPhase,
    local: LocalGame,
    mirror: MirrorGame,
    observers: Vec<Observer>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    connection: ConnectionPhase,
    local: Phase,
    mirror: Phase,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> ConnectionPhase {
        self.connection
    }

    pub fn is_paired(&self) -> bool {
        self.connection == ConnectionPhase::Paired
    }

    pub fn local(&self) -> &LocalGame {
        &self.local
    }

    pub fn mirror(&self) -> &MirrorGame {
        &self.mirror
    }

    /// Register a phase-change listener (e.g. to show a restart button)
    pub fn subscribe(&mut self, observer: impl FnMut(PhaseChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// A connection attempt has started
    pub fn begin_connect(&mut self) {
        self.transition(|s| s.connection = ConnectionPhase::Connecting);
    }

    /// The channel reported open: wait for an opponent
    pub fn channel_opened(&mut self) {
        self.transition(|s| {
            log::info!("Connected to relay, waiting for opponent");
            s.connection = ConnectionPhase::Waiting;
            s.local.set_phase(Phase::Waiting);
        });
    }

    /// The channel reported closed: stop simulating
    pub fn channel_closed(&mut self) {
        self.transition(|s| {
            if s.connection != ConnectionPhase::Disconnected {
                log::info!("Disconnected from relay");
            }
            s.connection = ConnectionPhase::Disconnected;
        });
    }

    /// Dispatch one inbound event.
    ///
    /// Pairing signals drive the state machine; game events go to the
    /// mirror, and only while paired.
    pub fn apply_event(&mut self, event: &SyncEvent) {
        self.transition(|s| match event {
            SyncEvent::OpponentConnected => match s.connection {
                ConnectionPhase::Waiting | ConnectionPhase::Paired => {
                    log::info!("Opponent connected");
                    s.connection = ConnectionPhase::Paired;
                    s.reset_boards();
                }
                other => log::debug!("Ignoring opponentConnected while {:?}", other),
            },
            SyncEvent::OpponentDisconnected => {
                if s.connection == ConnectionPhase::Paired {
                    log::info!("Opponent disconnected");
                    s.connection = ConnectionPhase::Waiting;
                    s.local.set_phase(Phase::Waiting);
                }
            }
            event if s.connection == ConnectionPhase::Paired => {
                s.mirror.apply(event);
            }
            event => log::debug!("Not paired, ignoring {}", event.kind()),
        });
    }

    /// One frame for both panes. Returns the local events to send.
    pub fn tick(&mut self, input: &TickInput) -> Vec<SyncEvent> {
        if !self.is_paired() {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.transition(|s| {
            events = s.local.tick(input);
            s.mirror.tick();
        });
        events
    }

    /// Programmatic restart of both boards without reconnecting
    pub fn reset_game(&mut self) {
        self.transition(Self::reset_boards);
    }

    fn reset_boards(&mut self) {
        log::info!("Resetting both boards");
        self.local.reset();
        self.mirror.reset();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            connection: self.connection,
            local: self.local.phase(),
            mirror: self.mirror.phase(),
        }
    }

    /// Run `change`, then tell observers about every phase that moved
    fn transition(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.snapshot();
        change(self);
        let after = self.snapshot();
        if before == after {
            return;
        }

        let mut changes = Vec::with_capacity(3);
        if before.connection != after.connection {
            changes.push(PhaseChange::Connection(after.connection));
        }
        if before.local != after.local {
            changes.push(PhaseChange::Local(after.local));
        }
        if before.mirror != after.mirror {
            changes.push(PhaseChange::Mirror(after.mirror));
        }
        for change in changes {
            for observer in &mut self.observers {
                observer(change);
            }
        }
    }
}
