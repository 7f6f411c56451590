//! Peer synchronization
//!
//! - `protocol`: the closed set of JSON sync messages
//! - `channel`: open/closed gate over a text transport; drops rather than queues
//! - `session`: pairing state machine owning both panes
//! - `peer`: adapter that wires a transport's callbacks into a session
//! - `loopback`: in-memory transport for headless runs and tests

pub mod channel;
pub mod loopback;
pub mod peer;
pub mod protocol;
pub mod session;

pub use channel::{ChannelState, ChannelStats, SyncChannel, Transport, TransportError};
pub use loopback::{LoopbackTransport, Wire};
pub use peer::Peer;
pub use protocol::{Outcome, ProtocolError, SyncEvent};
pub use session::{ConnectionPhase, GameSession, PhaseChange};
