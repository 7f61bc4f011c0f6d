//! Single-slot persisted connection config.
//!
//! Exactly one [`StoredConfig`] lives under [`CONFIG_KEY`]. Reads never fail
//! towards the caller: an absent or undecodable record is `None`. The
//! placeholder server value left behind by older page revisions is normalized
//! away on every read, and [`ConfigStore::load_and_repair`] writes the
//! normalized record back once.

use std::rc::Rc;

use ba_api_types::{ConnectionParams, SaveNacosConfigRequest};
use ba_storage::{SlotStore, get_json, put_json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{AdminError, Result};

pub const CONFIG_KEY: &str = "dbConfig";

/// Server values that mean "nothing configured" and must never be observable.
pub const DISCONNECTED_PLACEHOLDERS: [&str; 2] = ["disconnected", "未连接"];

pub const DEFAULT_NAMESPACE: &str = "server";
pub const DEFAULT_USERNAME: &str = "nacos";
pub const DEFAULT_PASSWORD: &str = "nacos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfigKind {
    Nacos,
    Environment,
    Other(String),
}

impl From<String> for ConfigKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "nacos" => ConfigKind::Nacos,
            "environment" => ConfigKind::Environment,
            _ => ConfigKind::Other(value),
        }
    }
}

impl From<ConfigKind> for String {
    fn from(kind: ConfigKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl ConfigKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigKind::Nacos => "nacos",
            ConfigKind::Environment => "environment",
            ConfigKind::Other(other) => other,
        }
    }
}

/// User-editable connection parameters. Unknown fields are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_addresses: Option<String>,
    /// Field name used by older revisions of the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, rename = "envName", skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn is_placeholder(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| DISCONNECTED_PLACEHOLDERS.contains(&v))
}

impl ConfigPayload {
    pub fn nacos(server_addresses: &str, namespace: &str, username: &str, password: &str) -> Self {
        Self {
            server_addresses: Some(server_addresses.to_owned()),
            namespace: Some(namespace.to_owned()),
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
            ..Default::default()
        }
    }

    /// The configured server address, falling back to the legacy field.
    pub fn server_address(&self) -> Option<&str> {
        non_empty(&self.server_addresses).or_else(|| non_empty(&self.server))
    }

    pub fn namespace(&self) -> Option<&str> {
        non_empty(&self.namespace)
    }

    /// Replace placeholder server values with `""`. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        if is_placeholder(&self.server_addresses) {
            self.server_addresses = Some(String::new());
            changed = true;
        }
        if is_placeholder(&self.server) {
            self.server = Some(String::new());
            changed = true;
        }
        changed
    }

    /// Server address and namespace only, as sent with balance requests.
    pub fn balance_params(&self) -> ConnectionParams {
        ConnectionParams {
            server_address: self.server_address().map(ToOwned::to_owned),
            namespace: self.namespace().map(ToOwned::to_owned),
            username: None,
            password: None,
        }
    }

    /// Full Nacos parameters with defaults applied, as sent with password requests.
    /// `None` when no server address is configured.
    pub fn nacos_params(&self) -> Option<ConnectionParams> {
        let server = self.server_address()?;
        Some(ConnectionParams {
            server_address: Some(server.to_owned()),
            namespace: Some(self.namespace().unwrap_or(DEFAULT_NAMESPACE).to_owned()),
            username: Some(non_empty(&self.username).unwrap_or(DEFAULT_USERNAME).to_owned()),
            password: Some(non_empty(&self.password).unwrap_or(DEFAULT_PASSWORD).to_owned()),
        })
    }

    pub fn to_save_request(&self) -> SaveNacosConfigRequest {
        SaveNacosConfigRequest {
            server_addresses: self.server_address().unwrap_or_default().to_owned(),
            namespace: self.namespace.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(rename = "type")]
    pub kind: ConfigKind,
    #[serde(default)]
    pub data: ConfigPayload,
    #[serde(default)]
    pub timestamp: i64,
}

impl StoredConfig {
    pub fn is_nacos(&self) -> bool {
        self.kind == ConfigKind::Nacos
    }

    /// Status line shown next to the config badge.
    pub fn status_text(&self) -> String {
        match self.kind {
            ConfigKind::Nacos => format!("Nacos: {}", self.data.server_address().unwrap_or("")),
            _ => format!("Environment: {}", self.data.env_name.as_deref().unwrap_or("")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: StoredConfig,
    /// True when the stored record carried a placeholder and was rewritten.
    pub repaired: bool,
}

#[derive(Clone)]
pub struct ConfigStore {
    store: Rc<dyn SlotStore>,
    clock: Rc<dyn Clock>,
}

impl ConfigStore {
    pub fn new(store: Rc<dyn SlotStore>, clock: Rc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn read(&self) -> Option<StoredConfig> {
        match get_json::<StoredConfig>(self.store.as_ref(), CONFIG_KEY) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "failed to load stored config");
                None
            }
        }
    }

    /// Pure read. The returned value is normalized; storage is left untouched.
    pub fn load(&self) -> Option<StoredConfig> {
        let mut config = self.read()?;
        config.data.normalize();
        Some(config)
    }

    /// Read, and rewrite the record once if it still carries a placeholder.
    pub fn load_and_repair(&self) -> Option<LoadedConfig> {
        let mut config = self.read()?;
        if !config.data.normalize() {
            return Some(LoadedConfig {
                config,
                repaired: false,
            });
        }

        debug!("stored config carried a placeholder server value, rewriting");
        match self.save(config.kind.clone(), config.data.clone()) {
            Ok(saved) => Some(LoadedConfig {
                config: saved,
                repaired: true,
            }),
            Err(err) => {
                warn!(error = %err, "failed to rewrite repaired config");
                Some(LoadedConfig {
                    config,
                    repaired: false,
                })
            }
        }
    }

    /// Overwrite the single record. Only the placeholder is fixed up; the
    /// payload is otherwise stored as given.
    pub fn save(&self, kind: ConfigKind, mut data: ConfigPayload) -> Result<StoredConfig> {
        data.normalize();
        let config = StoredConfig {
            kind,
            data,
            timestamp: self.clock.now_ms(),
        };
        put_json(self.store.as_ref(), CONFIG_KEY, &config).map_err(AdminError::Storage)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;
    use ba_storage::InMemorySlotStore;

    fn fixture() -> (Rc<InMemorySlotStore>, Rc<ManualClock>, ConfigStore) {
        let slots = Rc::new(InMemorySlotStore::new());
        let clock = Rc::new(ManualClock::new(1_700_000_000_000));
        let store = ConfigStore::new(slots.clone(), clock.clone());
        (slots, clock, store)
    }

    #[test]
    fn save_then_load_roundtrip_without_extra_writes() {
        let (slots, _clock, store) = fixture();
        let payload = ConfigPayload::nacos("10.0.0.1", "server", "nacos", "secret");
        let saved = store.save(ConfigKind::Nacos, payload.clone()).unwrap();
        assert_eq!(saved.timestamp, 1_700_000_000_000);
        assert_eq!(slots.write_count(), 1);

        let loaded = store.load_and_repair().unwrap();
        assert!(!loaded.repaired);
        assert_eq!(loaded.config.data, payload);
        assert_eq!(store.load().unwrap(), saved);
        assert_eq!(slots.write_count(), 1);
    }

    #[test]
    fn placeholder_is_never_observable() {
        let (slots, _clock, store) = fixture();
        slots
            .set(
                CONFIG_KEY,
                r#"{"type":"nacos","data":{"server_addresses":"disconnected","namespace":"server"},"timestamp":1}"#,
            )
            .unwrap();

        let pure = store.load().unwrap();
        assert_eq!(pure.data.server_addresses.as_deref(), Some(""));
        assert_eq!(slots.write_count(), 1, "pure load must not write");

        let first = store.load_and_repair().unwrap();
        assert!(first.repaired);
        assert_eq!(first.config.data.server_addresses.as_deref(), Some(""));
        assert_eq!(slots.write_count(), 2);

        let second = store.load_and_repair().unwrap();
        assert!(!second.repaired);
        assert_eq!(slots.write_count(), 2);
    }

    #[test]
    fn legacy_server_field_is_normalized_too() {
        let (slots, _clock, store) = fixture();
        slots
            .set(
                CONFIG_KEY,
                r#"{"type":"nacos","data":{"server":"未连接"},"timestamp":1}"#,
            )
            .unwrap();
        let loaded = store.load_and_repair().unwrap();
        assert!(loaded.repaired);
        assert_eq!(loaded.config.data.server.as_deref(), Some(""));
        assert_eq!(loaded.config.data.server_address(), None);
    }

    #[test]
    fn save_strips_placeholder_and_keeps_unknown_fields() {
        let (slots, _clock, store) = fixture();
        let mut payload: ConfigPayload =
            serde_json::from_str(r#"{"server_addresses":"disconnected","color":"blue"}"#).unwrap();
        payload.namespace = Some("server".into());
        store.save(ConfigKind::Other("legacy".into()), payload).unwrap();

        let raw = slots.get(CONFIG_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "legacy");
        assert_eq!(value["data"]["server_addresses"], "");
        assert_eq!(value["data"]["color"], "blue");
    }

    #[test]
    fn corrupt_or_missing_record_loads_as_none() {
        let (slots, _clock, store) = fixture();
        assert!(store.load().is_none());
        assert!(store.load_and_repair().is_none());

        slots.set(CONFIG_KEY, "{broken").unwrap();
        assert!(store.load().is_none());
        assert!(store.load_and_repair().is_none());
    }

    #[test]
    fn nacos_params_apply_defaults() {
        let payload = ConfigPayload {
            server_addresses: Some("10.0.0.1".into()),
            ..Default::default()
        };
        let params = payload.nacos_params().unwrap();
        assert_eq!(params.namespace.as_deref(), Some(DEFAULT_NAMESPACE));
        assert_eq!(params.username.as_deref(), Some(DEFAULT_USERNAME));
        assert_eq!(params.password.as_deref(), Some(DEFAULT_PASSWORD));

        assert!(ConfigPayload::default().nacos_params().is_none());

        let balance = payload.balance_params();
        assert_eq!(balance.namespace, None);
        assert_eq!(balance.username, None);
    }

    #[test]
    fn status_text_by_kind() {
        let nacos = StoredConfig {
            kind: ConfigKind::Nacos,
            data: ConfigPayload::nacos("10.0.0.1", "server", "", ""),
            timestamp: 0,
        };
        assert_eq!(nacos.status_text(), "Nacos: 10.0.0.1");

        let env = StoredConfig {
            kind: ConfigKind::Environment,
            data: ConfigPayload {
                env_name: Some("dev".into()),
                ..Default::default()
            },
            timestamp: 0,
        };
        assert_eq!(env.status_text(), "Environment: dev");
    }
}
