//! Navigation guard
//!
//! Runs before every navigation (level admission, then the hyperspace
//! transition) and after every committed one (end of transition).
//!
//! Admission for `/level<N>`:
//! 1. The navigation token is consumed, whatever the outcome
//! 2. Level 0 is always open
//! 3. Coming from outside a level requires a fresh token, else back to Menu
//! 4. Levels past the unlock frontier go to the Levels overview
//! 5. Any storage failure goes to Menu

use std::cell::RefCell;
use std::rc::Rc;

use super::Location;
use crate::consts::{LEVELS_ROUTE, MENU_ROUTE};
use crate::error::StorageError;
use crate::platform::{Clock, Delay, SignalEvent, TransitionSignals};
use crate::progress::{NavTokenStore, ProgressStore};
use crate::settings::Settings;
use crate::{is_level_path, level_number};

/// Why a navigation was redirected
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Entered a level from outside without a fresh token
    NoToken,
    /// Level is past the unlock frontier
    Locked { level: u32, frontier: u32 },
    /// Progress could not be read
    Storage(StorageError),
}

/// Guard verdict for one navigation
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Allow,
    /// Navigate to the named route instead
    Redirect {
        to: &'static str,
        reason: RejectReason,
    },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Redirect target route name, if any
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { to, .. } => Some(*to),
        }
    }
}

/// Navigation guard with its injected state
pub struct NavigationGuard {
    progress: ProgressStore,
    tokens: NavTokenStore,
    clock: Rc<dyn Clock>,
    delay: Rc<dyn Delay>,
    signals: Rc<dyn TransitionSignals>,
    settings: RefCell<Settings>,
}

impl NavigationGuard {
    pub fn new(
        progress: ProgressStore,
        tokens: NavTokenStore,
        clock: Rc<dyn Clock>,
        delay: Rc<dyn Delay>,
        signals: Rc<dyn TransitionSignals>,
    ) -> Self {
        Self {
            progress,
            tokens,
            clock,
            delay,
            signals,
            settings: RefCell::new(Settings::default()),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        *self.settings.get_mut() = settings;
        self
    }

    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    /// Swap preferences; the next navigation uses them
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.borrow_mut() = settings;
    }

    /// Before-hook: admission, then the transition pause
    pub async fn before_each(&self, to: &Location, from: Option<&Location>) -> GuardDecision {
        let decision = self.admit(&to.path, from.map(|l| l.path.as_str()));
        if decision.is_allowed() {
            self.transition(to, from).await;
        }
        decision
    }

    /// After-hook: the destination is mounted
    pub fn after_each(&self) {
        if let Err(e) = self.signals.emit(SignalEvent::End) {
            log::debug!("Transition end signal dropped: {}", e);
        }
    }

    /// Decide whether `to` may be entered coming from `from`
    pub fn admit(&self, to: &str, from: Option<&str>) -> GuardDecision {
        let Some(level) = level_number(to) else {
            return GuardDecision::Allow;
        };

        let decision = match self.admit_level(level, from) {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("Progress unavailable, sending {} to menu: {}", to, e);
                GuardDecision::Redirect {
                    to: MENU_ROUTE,
                    reason: RejectReason::Storage(e),
                }
            }
        };
        if let GuardDecision::Redirect { to: target, reason } = &decision {
            log::info!("Blocked {} -> {} ({:?})", to, target, reason);
        }
        decision
    }

    fn admit_level(&self, level: u32, from: Option<&str>) -> Result<GuardDecision, StorageError> {
        let token = self.tokens.take()?;
        if level == 0 {
            return Ok(GuardDecision::Allow);
        }

        let now = self.clock.now_ms();
        let window_ms = self.settings.borrow().token_window_ms;
        let fresh = token.is_some_and(|t| t.is_fresh(now, window_ms));
        let from_level = from.is_some_and(is_level_path);
        if !from_level && !fresh {
            return Ok(GuardDecision::Redirect {
                to: MENU_ROUTE,
                reason: RejectReason::NoToken,
            });
        }

        let frontier = self.progress.completed()?.unlock_frontier();
        if level > frontier {
            return Ok(GuardDecision::Redirect {
                to: LEVELS_ROUTE,
                reason: RejectReason::Locked { level, frontier },
            });
        }
        Ok(GuardDecision::Allow)
    }

    /// Fire the start signal and hold the navigation for the effect.
    /// Skipped on the initial load and when staying on the same location.
    pub async fn transition(&self, to: &Location, from: Option<&Location>) {
        let Some(from) = from else {
            return;
        };
        if from.full_path == to.full_path {
            return;
        }

        let duration_ms = self.settings.borrow().effective_transition_ms();
        if let Err(e) = self.signals.emit(SignalEvent::Start { duration_ms }) {
            log::debug!("Transition start signal dropped: {}", e);
        }
        if duration_ms > 0 {
            self.delay.delay(duration_ms).await;
        }
    }
}
