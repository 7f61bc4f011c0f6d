use serde::{Deserialize, Serialize};

pub const GET_BALANCE: &str = "/get_balance";
pub const UPDATE_BALANCE: &str = "/update_balance";
pub const VERIFY_PASSWORD: &str = "/verify_password";
pub const UPDATE_PASSWORD: &str = "/update_password";
pub const SAVE_NACOS_CONFIG: &str = "/save_nacos_config";
pub const GET_NACOS_CONFIGS: &str = "/get_nacos_configs";
pub const GET_GATEWAY_URL: &str = "/get_gateway_url";
pub const SET_ENVIRONMENT: &str = "/set_environment";

/// Ordered `name=value` pairs, used for both query strings and form bodies.
pub type Pairs = Vec<(&'static str, String)>;

/// Nacos connection parameters appended to the query string of balance and
/// password requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionParams {
    pub server_address: Option<String>,
    pub namespace: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionParams {
    pub fn pairs(&self) -> Pairs {
        let mut pairs = Vec::new();
        push_present(&mut pairs, "server_address", &self.server_address);
        push_present(&mut pairs, "namespace", &self.namespace);
        push_present(&mut pairs, "username", &self.username);
        push_present(&mut pairs, "password", &self.password);
        pairs
    }
}

fn push_present(pairs: &mut Pairs, name: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            pairs.push((name, v.clone()));
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceQueryRequest {
    pub phone: String,
    pub connection: ConnectionParams,
}

impl BalanceQueryRequest {
    pub fn query(&self) -> Pairs {
        let mut pairs = vec![("phone", self.phone.clone())];
        pairs.extend(self.connection.pairs());
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceUpdateRequest {
    pub phone: String,
    pub balance: String,
    pub connection: ConnectionParams,
}

impl BalanceUpdateRequest {
    pub fn query(&self) -> Pairs {
        self.connection.pairs()
    }

    pub fn form(&self) -> Pairs {
        vec![("phone", self.phone.clone()), ("balance", self.balance.clone())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordVerifyRequest {
    pub phone: String,
    pub password: String,
    pub connection: ConnectionParams,
}

impl PasswordVerifyRequest {
    pub fn query(&self) -> Pairs {
        self.connection.pairs()
    }

    pub fn form(&self) -> Pairs {
        vec![("phone", self.phone.clone()), ("password", self.password.clone())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordUpdateRequest {
    pub phone: String,
    pub new_password: String,
    pub connection: ConnectionParams,
}

impl PasswordUpdateRequest {
    pub fn query(&self) -> Pairs {
        self.connection.pairs()
    }

    pub fn form(&self) -> Pairs {
        vec![
            ("phone", self.phone.clone()),
            ("new_password", self.new_password.clone()),
        ]
    }
}

/// JSON body of `POST /save_nacos_config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveNacosConfigRequest {
    pub server_addresses: String,
    pub namespace: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayLookupRequest {
    pub server_address: String,
    pub namespace: String,
}

impl GatewayLookupRequest {
    pub fn query(&self) -> Pairs {
        vec![
            ("server_address", self.server_address.clone()),
            ("namespace", self.namespace.clone()),
        ]
    }
}

/// Common `{success, message, data}` response shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BalanceData {
    #[serde(default)]
    pub balance: Option<serde_json::Number>,
    #[serde(default)]
    pub encrypt: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub server_info: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayUrlResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentSwitchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// One known Nacos server, as listed by `GET /get_nacos_configs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NacosServerOption {
    #[serde(default)]
    pub server_addresses: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Either a date string or an epoch-ms number, depending on the backend revision.
    #[serde(default)]
    pub last_modified_time: Option<serde_json::Value>,
}

/// `GET /get_nacos_configs` returns either a bare array or `{configs: [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NacosConfigList {
    Bare(Vec<NacosServerOption>),
    Wrapped {
        #[serde(default)]
        configs: Vec<NacosServerOption>,
    },
}

impl NacosConfigList {
    pub fn into_options(self) -> Vec<NacosServerOption> {
        match self {
            NacosConfigList::Bare(options) => options,
            NacosConfigList::Wrapped { configs } => configs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_pairs_skip_empty_values() {
        let params = ConnectionParams {
            server_address: Some("10.0.0.1:8848".into()),
            namespace: Some(String::new()),
            username: None,
            password: Some("nacos".into()),
        };
        assert_eq!(
            params.pairs(),
            vec![
                ("server_address", "10.0.0.1:8848".to_string()),
                ("password", "nacos".to_string()),
            ]
        );
    }

    #[test]
    fn balance_query_puts_phone_first() {
        let req = BalanceQueryRequest {
            phone: "13800000000".into(),
            connection: ConnectionParams {
                server_address: Some("10.0.0.1".into()),
                namespace: Some("server".into()),
                ..Default::default()
            },
        };
        let names: Vec<&str> = req.query().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["phone", "server_address", "namespace"]);
    }

    #[test]
    fn config_list_accepts_both_shapes() {
        let bare: NacosConfigList =
            serde_json::from_str(r#"[{"server_addresses":"a"}]"#).unwrap();
        assert_eq!(bare.into_options().len(), 1);

        let wrapped: NacosConfigList =
            serde_json::from_str(r#"{"configs":[{"server_addresses":"a"},{"name":"b"}]}"#).unwrap();
        assert_eq!(wrapped.into_options().len(), 2);

        let empty: NacosConfigList = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.into_options().is_empty());
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let env: ApiEnvelope<BalanceData> =
            serde_json::from_str(r#"{"success":false,"message":"database connection lost"}"#)
                .unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());

        let ok: ApiEnvelope<BalanceData> = serde_json::from_str(
            r#"{"success":true,"data":{"balance":12.5,"encrypt":"abc","environment":"dev"}}"#,
        )
        .unwrap();
        let data = ok.data.unwrap();
        assert_eq!(data.balance.unwrap().to_string(), "12.5");
        assert_eq!(data.server_info, None);
    }
}
