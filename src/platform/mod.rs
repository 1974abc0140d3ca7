//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (localStorage/sessionStorage on web, in-memory elsewhere)
//! - Time and the transition delay
//! - Transition signals (window events on web, log lines elsewhere)

pub mod signals;
pub mod storage;
pub mod time;

pub use signals::{SignalEvent, TransitionSignals};
pub use storage::{KeyValueStore, MemoryStore};
pub use time::{Clock, Delay, DelayFuture};

#[cfg(target_arch = "wasm32")]
pub use signals::WindowSignals;
#[cfg(target_arch = "wasm32")]
pub use storage::WebStorage;
#[cfg(target_arch = "wasm32")]
pub use time::{TimerDelay, WebClock};

#[cfg(not(target_arch = "wasm32"))]
pub use signals::LogSignals;
#[cfg(not(target_arch = "wasm32"))]
pub use time::{SystemClock, ThreadDelay};
