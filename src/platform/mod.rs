//! Platform glue
//!
//! Browser implementations of the transport, surface, and input
//! collaborators. Native builds run headless and need none of it.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// `WebSocket.readyState` values
pub mod ready_state {
    pub const CONNECTING: u16 = 0;
    pub const OPEN: u16 = 1;
    pub const CLOSING: u16 = 2;
    pub const CLOSED: u16 = 3;
}

/// Whether a socket in `state` still needs an explicit `close()`
pub fn socket_needs_close(state: u16) -> bool {
    matches!(state, ready_state::CONNECTING | ready_state::OPEN)
}
