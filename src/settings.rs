//! Client preferences
//!
//! Persisted in LocalStorage on the web; native builds always use defaults.

use serde::{Deserialize, Serialize};

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Relay endpoint the client dials on startup
    pub server_url: String,

    // === Connection ===
    /// Dial again after the relay drops us instead of waiting for a reload
    pub auto_reconnect: bool,
    /// Delay before an automatic redial
    pub reconnect_delay_ms: u32,

    // === Display ===
    /// Render the opponent pane
    pub show_opponent: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:8080/ws".to_string(),

            // Reload-to-reconnect unless asked otherwise
            auto_reconnect: false,
            reconnect_delay_ms: 2000,

            show_opponent: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "twin_breakout_settings";

    /// Parse stored JSON, falling back to defaults for anything missing
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                None
            }
        }
    }

    /// Redial delay in the `i32` milliseconds `setTimeout` takes, or `None`
    /// when auto-reconnect is off. Oversized stored values saturate.
    pub fn reconnect_delay(&self) -> Option<i32> {
        self.auto_reconnect
            .then(|| i32::try_from(self.reconnect_delay_ms).unwrap_or(i32::MAX))
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No storage for {} on native", Self::STORAGE_KEY);
        Self::default()
    }
}
