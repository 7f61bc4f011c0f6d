//! Browser-backed state: `localStorage` slots and the JS clock.

use anyhow::{Result, anyhow};
use ba_admin_core::clock::Clock;
use ba_storage::SlotStore;

// ── localStorage helpers ──

fn storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| anyhow!("no window"))?
        .local_storage()
        .map_err(|e| anyhow!("localStorage unavailable: {:?}", e))?
        .ok_or_else(|| anyhow!("localStorage disabled"))
}

/// Slots kept verbatim in `window.localStorage`, shared with every other tab
/// of the same origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSlotStore;

impl SlotStore for LocalStorageSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        storage()?
            .get_item(key)
            .map_err(|e| anyhow!("localStorage read {key}: {:?}", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        storage()?
            .set_item(key, value)
            .map_err(|e| anyhow!("localStorage write {key}: {:?}", e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        storage()?
            .remove_item(key)
            .map_err(|e| anyhow!("localStorage remove {key}: {:?}", e))
    }
}

/// `Date.now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
