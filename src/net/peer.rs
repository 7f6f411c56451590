//! Transport adapter
//!
//! A [`Peer`] owns the sync channel and the session and is the only thing
//! that talks to both. Platform code forwards the transport's callbacks
//! (`open`, `close`, `message`) here and calls [`Peer::tick`] once per
//! frame; everything else stays transport-agnostic.

use super::channel::{SyncChannel, Transport};
use super::protocol::SyncEvent;
use super::session::GameSession;
use crate::sim::TickInput;

pub struct Peer<T> {
    channel: SyncChannel<T>,
    session: GameSession,
}

impl<T: Transport> Peer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            channel: SyncChannel::new(transport),
            session: GameSession::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn channel(&self) -> &SyncChannel<T> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut SyncChannel<T> {
        &mut self.channel
    }

    /// A connection attempt is under way on the transport
    pub fn connect(&mut self) {
        self.channel.begin_connect();
        self.session.begin_connect();
    }

    pub fn handle_open(&mut self) {
        if self.channel.mark_open() {
            self.session.channel_opened();
        }
    }

    pub fn handle_close(&mut self) {
        self.channel.mark_closed();
        self.session.channel_closed();
    }

    /// Decode one inbound frame and dispatch it. Bad frames are dropped.
    pub fn handle_message(&mut self, text: &str) {
        if let Some(event) = self.channel.receive(text) {
            self.apply_event(&event);
        }
    }

    /// Single entry point for already-decoded events
    pub fn apply_event(&mut self, event: &SyncEvent) {
        self.session.apply_event(event);
    }

    /// Advance both panes one frame and ship the local events.
    ///
    /// Returns how many events reached the transport.
    pub fn tick(&mut self, input: &TickInput) -> usize {
        let mut sent = 0;
        for event in self.session.tick(input) {
            if self.channel.send(&event) {
                sent += 1;
            }
        }
        sent
    }

    pub fn lives(&self) -> u32 {
        self.session.local().lives()
    }

    pub fn reset_game(&mut self) {
        self.session.reset_game();
    }

    pub fn disconnect(&mut self) {
        self.channel.close();
        self.session.channel_closed();
    }

    /// Redial on a new transport. Observers and boards survive; pairing
    /// starts over and resets both boards as usual.
    pub fn reconnect(&mut self, transport: T) {
        log::info!("Reconnecting");
        drop(self.channel.replace_transport(transport));
        self.session.channel_closed();
        self.connect();
    }
}
