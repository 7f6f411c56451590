//! Keyboard mapping
//!
//! Platforms report which keys are held; this turns that into a
//! [`TickInput`]. Keys are matched on their lowercased `KeyboardEvent.key`.

use crate::sim::TickInput;

const LEFT_KEYS: [&str; 2] = ["arrowleft", "a"];
const RIGHT_KEYS: [&str; 2] = ["arrowright", "d"];

/// Anything that can answer "is this key held right now"
pub trait InputSource {
    fn is_pressed(&self, key: &str) -> bool;
}

/// Normalize a key name the way [`InputSource`] implementations store it
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// Sample the held keys for one frame
pub fn poll(source: &impl InputSource) -> TickInput {
    TickInput {
        left: LEFT_KEYS.iter().any(|k| source.is_pressed(k)),
        right: RIGHT_KEYS.iter().any(|k| source.is_pressed(k)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Held(HashSet<String>);

    impl Held {
        fn of(keys: &[&str]) -> Self {
            Self(keys.iter().map(|k| normalize_key(k)).collect())
        }
    }

    impl InputSource for Held {
        fn is_pressed(&self, key: &str) -> bool {
            self.0.contains(key)
        }
    }

    #[test]
    fn test_arrows_and_letters() {
        assert_eq!(poll(&Held::of(&["ArrowLeft"])), TickInput { left: true, right: false });
        assert_eq!(poll(&Held::of(&["D"])), TickInput { left: false, right: true });
        assert_eq!(poll(&Held::of(&["a", "ArrowRight"])), TickInput { left: true, right: true });
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(poll(&Held::of(&[" ", "Enter", "w"])), TickInput::default());
    }
}
