//! Wall clock and the cooperative transition delay

use std::future::Future;
use std::pin::Pin;

/// Future returned by [`Delay::delay`]
pub type DelayFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Millisecond wall clock (same epoch as `Date.now()`)
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Suspends the navigation pipeline for a fixed time
pub trait Delay {
    fn delay(&self, ms: u32) -> DelayFuture;
}

/// `Date.now()` (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WebClock;

#[cfg(target_arch = "wasm32")]
impl Clock for WebClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// `setTimeout` wrapped in a promise (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerDelay;

#[cfg(target_arch = "wasm32")]
impl Delay for TimerDelay {
    fn delay(&self, ms: u32) -> DelayFuture {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                // No timer available: don't hold the navigation hostage
                let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
            }
        });
        Box::pin(async move {
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        })
    }
}

/// System time (native)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Blocking sleep (native)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

#[cfg(not(target_arch = "wasm32"))]
impl Delay for ThreadDelay {
    fn delay(&self, ms: u32) -> DelayFuture {
        Box::pin(async move {
            std::thread::sleep(std::time::Duration::from_millis(ms as u64));
        })
    }
}
