//! Time-boxed cache of the last resolved gateway domain, and the pure
//! mapping from resolution state to what the header shows.

use std::rc::Rc;

use ba_storage::{SlotStore, get_json, put_json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::error::{AdminError, Result};

pub const GATEWAY_CACHE_KEY: &str = "gatewayDomain";
pub const GATEWAY_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCacheEntry {
    pub domain: String,
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct GatewayCache {
    store: Rc<dyn SlotStore>,
    clock: Rc<dyn Clock>,
}

impl GatewayCache {
    pub fn new(store: Rc<dyn SlotStore>, clock: Rc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Overwrite the slot. Blank domains are ignored.
    pub fn save_to_cache(&self, domain: &str) -> Result<()> {
        if domain.trim().is_empty() {
            return Ok(());
        }
        let entry = GatewayCacheEntry {
            domain: domain.to_owned(),
            timestamp: self.clock.now_ms(),
        };
        put_json(self.store.as_ref(), GATEWAY_CACHE_KEY, &entry).map_err(AdminError::Storage)
    }

    /// The stored entry regardless of age.
    pub fn entry(&self) -> Option<GatewayCacheEntry> {
        match get_json::<GatewayCacheEntry>(self.store.as_ref(), GATEWAY_CACHE_KEY) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "failed to read gateway cache");
                None
            }
        }
    }

    /// The cached domain while fresh. Expired entries are ignored, not evicted.
    /// A timestamp in the future or out of range counts as expired.
    pub fn get_from_cache(&self) -> Option<String> {
        let entry = self.entry()?;
        let fresh = self
            .clock
            .now_ms()
            .checked_sub(entry.timestamp)
            .is_some_and(|age| (0..GATEWAY_CACHE_TTL_MS).contains(&age));
        fresh.then_some(entry.domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnconfiguredReason {
    /// No stored config, or one that is not a Nacos config.
    Missing,
    /// Nacos config without a server address or namespace.
    Incomplete,
}

/// What the gateway indicator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainDisplay {
    Loading { cached: Option<String> },
    Resolved {
        domain: String,
        server_address: Option<String>,
    },
    Cached { domain: String },
    Unresolved,
    Unconfigured(UnconfiguredReason),
}

impl DomainDisplay {
    pub fn domain(&self) -> Option<&str> {
        match self {
            DomainDisplay::Loading { cached } => cached.as_deref(),
            DomainDisplay::Resolved { domain, .. } | DomainDisplay::Cached { domain } => {
                Some(domain.as_str())
            }
            DomainDisplay::Unresolved | DomainDisplay::Unconfigured(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DomainDisplay::Loading { .. })
    }

    pub fn text(&self) -> String {
        match self {
            DomainDisplay::Loading { cached: None } => "Loading...".to_owned(),
            DomainDisplay::Unresolved => "Gateway not resolved".to_owned(),
            DomainDisplay::Unconfigured(UnconfiguredReason::Missing) => {
                "Nacos not configured".to_owned()
            }
            DomainDisplay::Unconfigured(UnconfiguredReason::Incomplete) => {
                "Nacos config incomplete".to_owned()
            }
            other => other.domain().unwrap_or_default().to_owned(),
        }
    }

    pub fn tooltip(&self) -> Option<String> {
        match self {
            DomainDisplay::Resolved {
                domain,
                server_address: Some(server),
            } => Some(format!("Server: {server}\nGateway: {domain}")),
            DomainDisplay::Resolved { domain, .. } | DomainDisplay::Cached { domain } => {
                Some(domain.clone())
            }
            _ => None,
        }
    }
}

/// Pure display rule: a live domain wins, then the loading state, then the
/// cache, then the unresolved indicator.
pub fn domain_display(domain: Option<&str>, is_loading: bool, cached: Option<String>) -> DomainDisplay {
    match domain.filter(|d| !d.trim().is_empty()) {
        Some(domain) => DomainDisplay::Resolved {
            domain: domain.to_owned(),
            server_address: None,
        },
        None if is_loading => DomainDisplay::Loading { cached },
        None => match cached {
            Some(domain) => DomainDisplay::Cached { domain },
            None => DomainDisplay::Unresolved,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;
    use ba_storage::InMemorySlotStore;

    fn fixture() -> (Rc<InMemorySlotStore>, Rc<ManualClock>, GatewayCache) {
        let slots = Rc::new(InMemorySlotStore::new());
        let clock = Rc::new(ManualClock::new(1_000));
        let cache = GatewayCache::new(slots.clone(), clock.clone());
        (slots, clock, cache)
    }

    #[test]
    fn blank_domain_is_not_cached() {
        let (slots, _clock, cache) = fixture();
        cache.save_to_cache("").unwrap();
        cache.save_to_cache("   ").unwrap();
        assert_eq!(slots.write_count(), 0);
        assert_eq!(cache.get_from_cache(), None);
    }

    #[test]
    fn entries_expire_after_a_day_but_stay_stored() {
        let (_slots, clock, cache) = fixture();
        cache.save_to_cache("gw.example.com").unwrap();

        clock.advance(GATEWAY_CACHE_TTL_MS - 1);
        assert_eq!(cache.get_from_cache().as_deref(), Some("gw.example.com"));

        clock.advance(1);
        assert_eq!(cache.get_from_cache(), None);
        assert_eq!(cache.entry().unwrap().domain, "gw.example.com");
    }

    #[test]
    fn out_of_range_timestamps_are_not_fresh() {
        let (slots, _clock, cache) = fixture();
        slots
            .set(GATEWAY_CACHE_KEY, r#"{"domain":"gw","timestamp":-9223372036854775808}"#)
            .unwrap();
        assert_eq!(cache.get_from_cache(), None);

        slots
            .set(GATEWAY_CACHE_KEY, r#"{"domain":"gw","timestamp":9223372036854775807}"#)
            .unwrap();
        assert_eq!(cache.get_from_cache(), None);
    }

    #[test]
    fn last_write_wins() {
        let (_slots, _clock, cache) = fixture();
        cache.save_to_cache("a.example.com").unwrap();
        cache.save_to_cache("b.example.com").unwrap();
        assert_eq!(cache.get_from_cache().as_deref(), Some("b.example.com"));
    }

    #[test]
    fn malformed_entry_reads_as_absent() {
        let (slots, _clock, cache) = fixture();
        slots.set(GATEWAY_CACHE_KEY, "not-json").unwrap();
        assert_eq!(cache.get_from_cache(), None);
    }

    #[test]
    fn display_rules() {
        assert_eq!(
            domain_display(None, true, None),
            DomainDisplay::Loading { cached: None }
        );
        assert_eq!(
            domain_display(Some("gw"), true, Some("old".into())).domain(),
            Some("gw")
        );
        assert_eq!(
            domain_display(None, false, Some("old".into())),
            DomainDisplay::Cached {
                domain: "old".into()
            }
        );
        assert_eq!(domain_display(Some(""), false, None), DomainDisplay::Unresolved);
        assert_eq!(DomainDisplay::Unresolved.text(), "Gateway not resolved");
        assert_eq!(DomainDisplay::Loading { cached: None }.text(), "Loading...");
    }

    #[test]
    fn tooltip_names_server_when_known() {
        let shown = DomainDisplay::Resolved {
            domain: "gw.example.com".into(),
            server_address: Some("10.0.0.1".into()),
        };
        assert_eq!(
            shown.tooltip().as_deref(),
            Some("Server: 10.0.0.1\nGateway: gw.example.com")
        );
        assert_eq!(DomainDisplay::Unresolved.tooltip(), None);
    }
}
