//! Shared fixtures for guard and router tests

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::consts::{COMPLETED_KEY, NAV_TOKEN_KEY};
use crate::error::SignalError;
use crate::platform::{Clock, Delay, DelayFuture, KeyValueStore, MemoryStore, SignalEvent, TransitionSignals};
use crate::progress::{NavTokenStore, ProgressStore};
use crate::router::NavigationGuard;
use crate::settings::Settings;

pub type Trace = Rc<RefCell<Vec<String>>>;

/// Clock that only moves when told to
pub struct ManualClock(Cell<f64>);

impl ManualClock {
    pub fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// Pending for exactly one poll, so other futures get a turn
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Notes the requested duration and yields once instead of sleeping
pub struct TracedDelay(Trace);

impl Delay for TracedDelay {
    fn delay(&self, ms: u32) -> DelayFuture {
        self.0.borrow_mut().push(format!("delay {}", ms));
        Box::pin(YieldOnce(false))
    }
}

/// Records emitted signals, or fails every emit when switched
pub struct TracedSignals {
    trace: Trace,
    failing: Cell<bool>,
}

impl TracedSignals {
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl TransitionSignals for TracedSignals {
    fn emit(&self, event: SignalEvent) -> Result<(), SignalError> {
        if self.failing.get() {
            return Err(SignalError::NoWindow);
        }
        let line = match event {
            SignalEvent::Start { duration_ms } => format!("signal {} {}", event.name(), duration_ms),
            SignalEvent::End => format!("signal {}", event.name()),
        };
        self.trace.borrow_mut().push(line);
        Ok(())
    }
}

/// Guard wired to in-memory state
pub struct Harness {
    pub local: Rc<MemoryStore>,
    pub session: Rc<MemoryStore>,
    pub clock: Rc<ManualClock>,
    pub signals: Rc<TracedSignals>,
    pub delay: Rc<TracedDelay>,
    pub settings: Settings,
    pub guard: NavigationGuard,
    trace: Trace,
}

impl Harness {
    pub fn new(now_ms: f64) -> Self {
        Self::with_settings(now_ms, Settings::default())
    }

    pub fn with_settings(now_ms: f64, settings: Settings) -> Self {
        let trace: Trace = Rc::default();
        let local = Rc::new(MemoryStore::new());
        let session = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock(Cell::new(now_ms)));
        let signals = Rc::new(TracedSignals {
            trace: trace.clone(),
            failing: Cell::new(false),
        });
        let delay = Rc::new(TracedDelay(trace.clone()));
        let guard = build_guard(&local, &session, &clock, &signals, &delay, &settings);
        Self {
            local,
            session,
            clock,
            signals,
            delay,
            settings,
            guard,
            trace,
        }
    }

    /// Another guard over the same state
    pub fn build_guard(&self) -> NavigationGuard {
        build_guard(
            &self.local,
            &self.session,
            &self.clock,
            &self.signals,
            &self.delay,
            &self.settings,
        )
    }

    pub fn tokens(&self) -> NavTokenStore {
        NavTokenStore::new(self.session.clone())
    }

    pub fn issue_token(&self, issued_ms: f64) {
        self.tokens().issue(issued_ms).unwrap();
    }

    pub fn has_token(&self) -> bool {
        self.session.contains(NAV_TOKEN_KEY)
    }

    pub fn complete(&self, levels: &[u32]) {
        let json = serde_json::to_string(levels).unwrap();
        self.complete_raw(&json);
    }

    pub fn complete_raw(&self, json: &str) {
        self.local.set(COMPLETED_KEY, json).unwrap();
    }

    pub fn trace(&self) -> Vec<String> {
        self.trace.borrow().clone()
    }

    /// Shared trace, for fakes defined in a test
    pub fn trace_handle(&self) -> Trace {
        self.trace.clone()
    }
}

fn build_guard(
    local: &Rc<MemoryStore>,
    session: &Rc<MemoryStore>,
    clock: &Rc<ManualClock>,
    signals: &Rc<TracedSignals>,
    delay: &Rc<TracedDelay>,
    settings: &Settings,
) -> NavigationGuard {
    NavigationGuard::new(
        ProgressStore::new(local.clone()),
        NavTokenStore::new(session.clone()),
        clock.clone(),
        delay.clone(),
        signals.clone(),
    )
    .with_settings(settings.clone())
}
