//! Sync wire protocol.
//!
//! Every message is a JSON object tagged by `type`:
//!
//! | type                   | fields                           | direction        |
//! |------------------------|----------------------------------|------------------|
//! | `opponentConnected`    | none                             | relay -> client  |
//! | `opponentDisconnected` | none                             | relay -> client  |
//! | `paddleInput`          | `direction: "left" \| "right"`   | peer <-> peer    |
//! | `brickDestroyed`       | `x`, `y`, optional `id`          | peer <-> peer    |
//! | `livesUpdate`          | `lives` (integer >= 0)           | peer <-> peer    |
//! | `gameOver`             | `state: "win" \| "gameover"`     | peer <-> peer    |
//!
//! Delivery is fire-and-forget: no acknowledgement, no retry, no ordering
//! guarantee beyond what the transport happens to give. Appliers must be
//! idempotent on replay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::sim::Direction;
use crate::sim::Phase;

/// Errors produced while encoding or decoding a sync message
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no string `type` field")]
    MissingType,
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    #[error("invalid `{kind}` message: {source}")]
    InvalidFields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Terminal result carried by `gameOver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    GameOver,
}

impl From<Outcome> for Phase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Phase::Win,
            Outcome::GameOver => Phase::GameOver,
        }
    }
}

/// A message on the sync channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    /// The relay paired us with an opponent
    OpponentConnected,
    /// The opponent's connection went away
    OpponentDisconnected,
    /// The opponent's paddle moved one step
    PaddleInput { direction: Direction },
    /// One hit landed on the opponent brick at `(x, y)`
    BrickDestroyed {
        x: f32,
        y: f32,
        /// Stable brick id; peers that don't send it are matched by position
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u32>,
    },
    /// Authoritative opponent life count
    LivesUpdate { lives: u32 },
    /// The opponent's round ended
    GameOver { state: Outcome },
}

/// Wire names of every message type, in declaration order
pub const MESSAGE_TYPES: [&str; 6] = [
    "opponentConnected",
    "opponentDisconnected",
    "paddleInput",
    "brickDestroyed",
    "livesUpdate",
    "gameOver",
];

impl SyncEvent {
    /// Wire name of this message's `type`
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::OpponentConnected => MESSAGE_TYPES[0],
            SyncEvent::OpponentDisconnected => MESSAGE_TYPES[1],
            SyncEvent::PaddleInput { .. } => MESSAGE_TYPES[2],
            SyncEvent::BrickDestroyed { .. } => MESSAGE_TYPES[3],
            SyncEvent::LivesUpdate { .. } => MESSAGE_TYPES[4],
            SyncEvent::GameOver { .. } => MESSAGE_TYPES[5],
        }
    }

    /// Pairing signals originate at the relay, never at a peer
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            SyncEvent::OpponentConnected | SyncEvent::OpponentDisconnected
        )
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one inbound frame.
    ///
    /// Unknown `type` values are reported separately from malformed input so
    /// callers can ignore the former quietly.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_owned();
        if !MESSAGE_TYPES.contains(&kind.as_str()) {
            return Err(ProtocolError::UnknownType(kind));
        }
        serde_json::from_value(value).map_err(|source| ProtocolError::InvalidFields { kind, source })
    }
}
