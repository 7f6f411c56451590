//! The two panes of a session
//!
//! [`LocalGame`] is authoritative for this player's board and produces sync
//! events. [`MirrorGame`] replays the opponent's events onto a replica that
//! also runs its own cosmetic physics.

pub mod local;
pub mod mirror;

pub use local::LocalGame;
pub use mirror::MirrorGame;
