//! Level progress
//!
//! Two pieces of state gate level routes:
//! - the completed level numbers, a JSON array in durable storage
//! - the navigation token, a timestamp in session storage that the in-level
//!   "advance" action writes right before navigating and the guard consumes

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::consts::{BASE_FRONTIER, COMPLETED_KEY, MAX_LEVEL, NAV_TOKEN_KEY};
use crate::error::{ProgressError, StorageError};
use crate::platform::KeyValueStore;

/// Set of completed level numbers (1..=MAX_LEVEL)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    levels: BTreeSet<u32>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored JSON. Anything but an array is malformed; array
    /// entries that are not completable level numbers are skipped.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let malformed = |message: String| StorageError::Malformed {
            key: COMPLETED_KEY.to_string(),
            message,
        };
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        let entries = value
            .as_array()
            .ok_or_else(|| malformed(format!("expected an array, got {}", value)))?;

        let levels = entries
            .iter()
            .filter_map(|v| v.as_u64())
            .filter(|n| (1..=MAX_LEVEL as u64).contains(n))
            .map(|n| n as u32)
            .collect();
        Ok(Self { levels })
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(&self.levels).map_err(|e| StorageError::Encode {
            key: COMPLETED_KEY.to_string(),
            message: e.to_string(),
        })
    }

    pub fn contains(&self, level: u32) -> bool {
        self.levels.contains(&level)
    }

    /// Add a level, returns false if it was already there
    pub fn insert(&mut self, level: u32) -> bool {
        self.levels.insert(level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Highest level reachable by normal play.
    ///
    /// Levels come in pairs (1,2) (3,4) (5,6) (7,8). The first pair is
    /// always open; each later pair opens once both levels of the pair
    /// before it are completed.
    pub fn unlock_frontier(&self) -> u32 {
        let mut frontier = BASE_FRONTIER;
        for start in (BASE_FRONTIER + 1..MAX_LEVEL).step_by(2) {
            if self.contains(start - 2) && self.contains(start - 1) {
                frontier = start + 1;
            } else {
                break;
            }
        }
        frontier.min(MAX_LEVEL)
    }
}

impl FromIterator<u32> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Durable completed-levels storage
#[derive(Clone)]
pub struct ProgressStore {
    store: Rc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the completed levels (empty when nothing was stored yet)
    pub fn completed(&self) -> Result<CompletionSet, StorageError> {
        match self.store.get(COMPLETED_KEY)? {
            Some(json) => CompletionSet::from_json(&json),
            None => Ok(CompletionSet::new()),
        }
    }

    /// Record a finished level. Returns true if it was newly added.
    pub fn mark_completed(&self, level: u32) -> Result<bool, ProgressError> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(ProgressError::LevelOutOfRange(level));
        }
        let mut completed = self.completed()?;
        if !completed.insert(level) {
            return Ok(false);
        }
        self.store.set(COMPLETED_KEY, &completed.to_json()?)?;
        log::info!(
            "Level {} completed ({} of {} done)",
            level,
            completed.len(),
            MAX_LEVEL
        );
        Ok(true)
    }
}

/// A consumed navigation token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavToken {
    /// `Date.now()` when the token was issued
    pub issued_ms: f64,
}

impl NavToken {
    pub fn is_fresh(&self, now_ms: f64, window_ms: f64) -> bool {
        now_ms - self.issued_ms < window_ms
    }
}

/// Session-scoped one-shot navigation token
#[derive(Clone)]
pub struct NavTokenStore {
    store: Rc<dyn KeyValueStore>,
}

impl NavTokenStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Allow the next level navigation (called by the "advance" action)
    pub fn issue(&self, now_ms: f64) -> Result<(), StorageError> {
        self.store
            .set(NAV_TOKEN_KEY, &format!("{}", now_ms.trunc() as i64))
    }

    /// Read and delete the token. Text that is not a number counts as no token.
    pub fn take(&self) -> Result<Option<NavToken>, StorageError> {
        let Some(raw) = self.store.take(NAV_TOKEN_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<f64>() {
            Ok(issued_ms) if issued_ms.is_finite() => Ok(Some(NavToken { issued_ms })),
            _ => {
                log::debug!("Ignoring unparseable navigation token {:?}", raw);
                Ok(None)
            }
        }
    }
}
