use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock source in epoch milliseconds.
///
/// The browser build supplies its own (`Date.now()`); `SystemTime` is not
/// available on `wasm32-unknown-unknown`.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}
