//! Sync channel: best-effort, fire-and-forget message pipe to the peer.
//!
//! The channel owns a [`Transport`] and gates it on an open/closed state.
//! Sends while not open are dropped on the floor; there is no queue.
//! Inbound frames that fail to decode are logged and discarded so no peer
//! can crash an instance by sending garbage.

use thiserror::Error;

use super::protocol::{ProtocolError, SyncEvent};

/// Errors from the underlying transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("transport send failed: {0}")]
    Send(String),
}

/// Text-frame transport (WebSocket in the browser, in-memory in tests)
pub trait Transport {
    /// Hand one text frame to the transport. Must not block.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Tear the connection down. The transport reports the close through
    /// its own callback; the channel marks itself closed immediately.
    fn close(&mut self) {}
}

/// Channel lifecycle as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Never connected
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Running counters, mostly for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Frames handed to the transport
    pub sent: u64,
    /// Outbound events dropped (channel not open, or transport refused)
    pub dropped: u64,
    /// Inbound frames discarded (malformed, unknown, or channel not open)
    pub discarded: u64,
}

pub struct SyncChannel<T> {
    transport: T,
    state: ChannelState,
    stats: ChannelStats,
}

impl<T: Transport> SyncChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ChannelState::Idle,
            stats: ChannelStats::default(),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn begin_connect(&mut self) {
        self.state = ChannelState::Connecting;
    }

    /// Swap in a fresh transport for a redial. The old one is closed and
    /// handed back; counters carry over.
    pub fn replace_transport(&mut self, transport: T) -> T {
        self.close();
        self.state = ChannelState::Idle;
        std::mem::replace(&mut self.transport, transport)
    }

    /// Transport reported open. Returns true on an actual transition.
    pub fn mark_open(&mut self) -> bool {
        let changed = self.state != ChannelState::Open;
        self.state = ChannelState::Open;
        changed
    }

    /// Transport reported closed. Returns true on an actual transition.
    pub fn mark_closed(&mut self) -> bool {
        let changed = self.state != ChannelState::Closed;
        self.state = ChannelState::Closed;
        changed
    }

    /// Close from our side
    pub fn close(&mut self) {
        if self.state != ChannelState::Closed {
            self.transport.close();
            self.state = ChannelState::Closed;
        }
    }

    /// Serialize and transmit `event` if the channel is open.
    ///
    /// Returns whether the frame reached the transport. Failures are logged
    /// and counted, never surfaced: the protocol has no retry.
    pub fn send(&mut self, event: &SyncEvent) -> bool {
        if !self.is_open() {
            log::debug!("Channel {:?}, dropping {}", self.state, event.kind());
            self.stats.dropped += 1;
            return false;
        }
        let result = event
            .encode()
            .map_err(|e| TransportError::Send(e.to_string()))
            .and_then(|text| self.transport.send_text(&text));
        match result {
            Ok(()) => {
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                log::warn!("Failed to send {}: {}", event.kind(), e);
                self.stats.dropped += 1;
                false
            }
        }
    }

    /// Decode one inbound frame, or discard it.
    pub fn receive(&mut self, text: &str) -> Option<SyncEvent> {
        if !self.is_open() {
            log::debug!("Channel {:?}, discarding inbound frame", self.state);
            self.stats.discarded += 1;
            return None;
        }
        match SyncEvent::decode(text) {
            Ok(event) => Some(event),
            Err(ProtocolError::UnknownType(kind)) => {
                log::debug!("Ignoring message of unknown type `{}`", kind);
                self.stats.discarded += 1;
                None
            }
            Err(e) => {
                log::warn!("Discarding inbound message: {}", e);
                self.stats.discarded += 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<String>,
        refuse: bool,
        closed: bool,
    }

    impl Transport for Recorder {
        fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
            if self.refuse {
                return Err(TransportError::Closed);
            }
            self.frames.push(text.to_owned());
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    const LEFT: SyncEvent = SyncEvent::PaddleInput {
        direction: Direction::Left,
    };

    #[test]
    fn test_send_dropped_until_open() {
        let mut channel = SyncChannel::new(Recorder::default());
        channel.begin_connect();
        assert!(!channel.send(&LEFT));
        assert!(channel.transport().frames.is_empty());

        assert!(channel.mark_open());
        assert!(!channel.mark_open());
        assert!(channel.send(&LEFT));
        assert_eq!(
            channel.transport().frames,
            vec![r#"{"type":"paddleInput","direction":"left"}"#.to_string()]
        );
        assert_eq!(
            channel.stats(),
            ChannelStats { sent: 1, dropped: 1, discarded: 0 }
        );
    }

    #[test]
    fn test_transport_failure_is_swallowed() {
        let mut channel = SyncChannel::new(Recorder {
            refuse: true,
            ..Default::default()
        });
        channel.mark_open();
        assert!(!channel.send(&LEFT));
        assert_eq!(channel.stats().dropped, 1);
    }

    #[test]
    fn test_receive_discards_bad_frames() {
        let mut channel = SyncChannel::new(Recorder::default());
        channel.mark_open();
        assert_eq!(channel.receive("{oops"), None);
        assert_eq!(channel.receive(r#"{"type":"emote"}"#), None);
        assert_eq!(channel.receive(r#"{"type":"livesUpdate"}"#), None);
        assert_eq!(
            channel.receive(r#"{"type":"livesUpdate","lives":1}"#),
            Some(SyncEvent::LivesUpdate { lives: 1 })
        );
        assert_eq!(channel.stats().discarded, 3);
    }

    #[test]
    fn test_closed_channel_halts_delivery() {
        let mut channel = SyncChannel::new(Recorder::default());
        channel.mark_open();
        channel.close();
        assert!(channel.transport().closed);
        assert_eq!(channel.state(), ChannelState::Closed);
        assert_eq!(channel.receive(r#"{"type":"livesUpdate","lives":1}"#), None);
        assert!(!channel.send(&LEFT));
    }

    #[test]
    fn test_replace_transport_for_redial() {
        let mut channel = SyncChannel::new(Recorder::default());
        channel.mark_open();
        channel.send(&LEFT);

        let old = channel.replace_transport(Recorder::default());
        assert!(old.closed);
        assert_eq!(old.frames.len(), 1);
        assert_eq!(channel.state(), ChannelState::Idle);
        assert!(!channel.send(&LEFT));

        channel.mark_open();
        assert!(channel.send(&LEFT));
        assert_eq!(channel.transport().frames.len(), 1);
        assert_eq!(channel.stats().sent, 2);
    }
}
