//! Hyperspace transition signals
//!
//! The overlay that draws the effect is not part of this crate; it listens
//! for `hyperspace-start` / `hyperspace-end` on the window.

use serde::Serialize;

use crate::error::SignalError;

/// A transition signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Effect begins; navigation resumes after `duration_ms`
    Start { duration_ms: u32 },
    /// Destination has loaded
    End,
}

/// Payload carried by the start event
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDetail {
    pub duration_ms: u32,
}

impl SignalEvent {
    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            SignalEvent::Start { .. } => "hyperspace-start",
            SignalEvent::End => "hyperspace-end",
        }
    }

    /// JSON `detail` payload, if the event has one
    pub fn detail_json(&self) -> Option<String> {
        match self {
            SignalEvent::Start { duration_ms } => serde_json::to_string(&StartDetail {
                duration_ms: *duration_ms,
            })
            .ok(),
            SignalEvent::End => None,
        }
    }
}

/// Sink for transition signals
pub trait TransitionSignals {
    fn emit(&self, event: SignalEvent) -> Result<(), SignalError>;
}

/// Dispatches `CustomEvent`s on the window (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowSignals;

#[cfg(target_arch = "wasm32")]
impl TransitionSignals for WindowSignals {
    fn emit(&self, event: SignalEvent) -> Result<(), SignalError> {
        let name = event.name();
        let dispatch_err = |e: wasm_bindgen::JsValue| SignalError::Dispatch {
            event: name.to_string(),
            message: format!("{:?}", e),
        };

        let window = web_sys::window().ok_or(SignalError::NoWindow)?;
        let init = web_sys::CustomEventInit::new();
        if let Some(json) = event.detail_json() {
            let detail = js_sys::JSON::parse(&json).map_err(dispatch_err)?;
            init.set_detail(&detail);
        }
        let custom = web_sys::CustomEvent::new_with_event_init_dict(name, &init)
            .map_err(dispatch_err)?;
        window.dispatch_event(&custom).map_err(dispatch_err)?;
        Ok(())
    }
}

/// Logs signals instead of dispatching them (native)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSignals;

#[cfg(not(target_arch = "wasm32"))]
impl TransitionSignals for LogSignals {
    fn emit(&self, event: SignalEvent) -> Result<(), SignalError> {
        match event.detail_json() {
            Some(detail) => log::info!("{} {}", event.name(), detail),
            None => log::info!("{}", event.name()),
        }
        Ok(())
    }
}
