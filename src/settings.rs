//! Player preferences
//!
//! Persisted in LocalStorage next to the level progress.

use serde::{Deserialize, Serialize};

use crate::consts::{SETTINGS_KEY, TOKEN_WINDOW_MS, TRANSITION_MS};
use crate::error::StorageError;
use crate::platform::KeyValueStore;

/// Router timing and accessibility preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hyperspace effect length (ms)
    pub transition_ms: u32,
    /// How long an in-app "advance" click keeps a level route open (ms)
    pub token_window_ms: f64,
    /// Reduced motion (skip the transition pause, overlay gets 0 ms)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            transition_ms: TRANSITION_MS,
            token_window_ms: TOKEN_WINDOW_MS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Transition length after accessibility preferences
    pub fn effective_transition_ms(&self) -> u32 {
        if self.reduced_motion {
            0
        } else {
            self.transition_ms
        }
    }

    /// Flip reduced motion, returns the new value
    pub fn toggle_reduced_motion(&mut self) -> bool {
        self.reduced_motion = !self.reduced_motion;
        self.reduced_motion
    }

    /// Load settings from storage, defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to storage
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).map_err(|e| StorageError::Encode {
            key: SETTINGS_KEY.to_string(),
            message: e.to_string(),
        })?;
        store.set(SETTINGS_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
