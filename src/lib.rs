//! Hyperspace Levels - a multi-level browser game shell
//!
//! Core modules:
//! - `router`: Route table, navigation guard and the navigation driver
//! - `progress`: Completed levels and the one-shot navigation token
//! - `platform`: Browser/native seams (storage, time, transition signals)
//! - `scenes`: Content handlers attached to routes
//! - `settings`: Player-facing preferences

pub mod error;
pub mod platform;
pub mod progress;
pub mod router;
pub mod scenes;
pub mod settings;

pub use error::{ProgressError, SignalError, StorageError};
pub use progress::{CompletionSet, NavTokenStore, ProgressStore};
pub use router::{GuardDecision, NavigationGuard, NavigationOutcome, RouteTable, Router};
pub use scenes::Scene;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Highest level number in the game
    pub const MAX_LEVEL: u32 = 8;

    /// Frontier with nothing completed: the first pair (1, 2)
    pub const BASE_FRONTIER: u32 = 2;

    /// How long a navigation token stays valid (ms)
    pub const TOKEN_WINDOW_MS: f64 = 3000.0;

    /// Hyperspace transition length (ms)
    pub const TRANSITION_MS: u32 = 900;

    /// Consecutive redirects before a navigation is abandoned
    pub const MAX_REDIRECTS: usize = 10;

    /// localStorage key holding the completed level numbers
    pub const COMPLETED_KEY: &str = "levelsCompleted";

    /// localStorage key holding the player settings
    pub const SETTINGS_KEY: &str = "hyperspace_settings";

    /// sessionStorage key holding the navigation token
    pub const NAV_TOKEN_KEY: &str = "allowLevelNav";

    /// Route names used as redirect targets
    pub const MENU_ROUTE: &str = "Menu";
    pub const LEVELS_ROUTE: &str = "Levels";
    pub const NOT_FOUND_ROUTE: &str = "NotFound";
}

/// Extract the level number from a `/level<digits>` path.
///
/// Numbers that overflow `u32` saturate so they land past any frontier.
pub fn level_number(path: &str) -> Option<u32> {
    let digits = path.strip_prefix("/level")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

/// Whether a path has the level-route shape
#[inline]
pub fn is_level_path(path: &str) -> bool {
    level_number(path).is_some()
}

#[cfg(test)]
pub(crate) mod test_support;
