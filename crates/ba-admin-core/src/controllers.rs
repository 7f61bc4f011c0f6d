//! Form handling without side effects: input validation, request building and
//! turning responses into [`FormOutcome`]s. [`crate::session::AdminSession`]
//! drives these and does the I/O.

use ba_api_types::{
    ApiEnvelope, BalanceData, BalanceQueryRequest, BalanceUpdateRequest, PasswordUpdateRequest,
    PasswordVerifyRequest,
};

use crate::config_store::{ConfigPayload, StoredConfig};
use crate::error::AdminError;
use crate::messages::{friendly_message, transport_message};
use crate::validation::{require, validate_balance, validate_phone};
use crate::view::{Field, FormOutcome, OutcomeStatus, ResultArea};

/// Why a form was not submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Invalid { field: Field, message: String },
    /// Password operations need a Nacos server address.
    NacosNotConfigured,
}

fn invalid(field: Field, err: AdminError) -> Rejection {
    Rejection::Invalid {
        field,
        message: err.to_string(),
    }
}

/// Values typed into the config modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    pub server_address: String,
    pub namespace: String,
    pub username: String,
    pub password: String,
}

pub fn config_payload(form: &ConfigForm) -> Result<ConfigPayload, Rejection> {
    let server = require(&form.server_address, "Enter the Nacos server address")
        .map_err(|e| invalid(Field::ServerAddress, e))?;
    Ok(ConfigPayload::nacos(
        &server,
        form.namespace.trim(),
        form.username.trim(),
        form.password.trim(),
    ))
}

fn balance_connection(config: Option<&StoredConfig>) -> ba_api_types::ConnectionParams {
    config
        .filter(|c| c.is_nacos())
        .map(|c| c.data.balance_params())
        .unwrap_or_default()
}

fn nacos_connection(
    config: Option<&StoredConfig>,
) -> Result<ba_api_types::ConnectionParams, Rejection> {
    config
        .filter(|c| c.is_nacos())
        .and_then(|c| c.data.nacos_params())
        .ok_or(Rejection::NacosNotConfigured)
}

pub fn balance_query(
    phone: &str,
    config: Option<&StoredConfig>,
) -> Result<BalanceQueryRequest, Rejection> {
    let phone = validate_phone(phone).map_err(|e| invalid(Field::BalancePhone, e))?;
    Ok(BalanceQueryRequest {
        phone,
        connection: balance_connection(config),
    })
}

pub fn balance_update(
    phone: &str,
    balance: &str,
    config: Option<&StoredConfig>,
) -> Result<BalanceUpdateRequest, Rejection> {
    let phone = validate_phone(phone).map_err(|e| invalid(Field::BalancePhone, e))?;
    let balance = validate_balance(balance).map_err(|e| invalid(Field::BalanceAmount, e))?;
    Ok(BalanceUpdateRequest {
        phone,
        balance,
        connection: balance_connection(config),
    })
}

pub fn password_verify(
    phone: &str,
    password: &str,
    config: Option<&StoredConfig>,
) -> Result<PasswordVerifyRequest, Rejection> {
    let phone = validate_phone(phone).map_err(|e| invalid(Field::PasswordPhone, e))?;
    let password =
        require(password, "Enter the password").map_err(|e| invalid(Field::Password, e))?;
    Ok(PasswordVerifyRequest {
        phone,
        password,
        connection: nacos_connection(config)?,
    })
}

pub fn password_update(
    phone: &str,
    new_password: &str,
    config: Option<&StoredConfig>,
) -> Result<PasswordUpdateRequest, Rejection> {
    let phone = validate_phone(phone).map_err(|e| invalid(Field::PasswordPhone, e))?;
    let new_password =
        require(new_password, "Enter the new password").map_err(|e| invalid(Field::Password, e))?;
    Ok(PasswordUpdateRequest {
        phone,
        new_password,
        connection: nacos_connection(config)?,
    })
}

// ── Outcomes ──

fn outcome(area: ResultArea, status: OutcomeStatus, message: String) -> FormOutcome {
    FormOutcome {
        area,
        status,
        message,
        details: Vec::new(),
    }
}

pub fn rejected(area: ResultArea, message: &str) -> FormOutcome {
    outcome(area, OutcomeStatus::ValidationFailed, message.to_owned())
}

/// Failure before any application response was read.
pub fn failed(area: ResultArea, err: &AdminError) -> FormOutcome {
    let status = match err {
        AdminError::Validation(_) => OutcomeStatus::ValidationFailed,
        AdminError::Application(_) => OutcomeStatus::ApplicationFailed,
        _ => OutcomeStatus::TransportFailed,
    };
    outcome(area, status, transport_message(err))
}

fn application_failure<T>(area: ResultArea, envelope: &ApiEnvelope<T>, fallback: &str) -> FormOutcome {
    let raw = envelope.message.as_deref().unwrap_or(fallback);
    outcome(area, OutcomeStatus::ApplicationFailed, friendly_message(raw))
}

fn balance_details(data: &BalanceData) -> Vec<(String, String)> {
    let mut details = Vec::new();
    if let Some(balance) = &data.balance {
        details.push(("Balance".to_owned(), balance.to_string()));
    }
    let text_fields = [
        ("Encrypted", &data.encrypt),
        ("Environment", &data.environment),
        ("Server", &data.server_info),
    ];
    for (label, value) in text_fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            details.push((label.to_owned(), value.to_owned()));
        }
    }
    details
}

pub fn balance_queried(envelope: ApiEnvelope<BalanceData>) -> FormOutcome {
    if !envelope.success {
        return application_failure(ResultArea::Balance, &envelope, "Query failed");
    }
    let data = envelope.data.unwrap_or_default();
    let message = match &data.balance {
        Some(balance) => format!("Current balance: {balance}"),
        None => "Query succeeded".to_owned(),
    };
    FormOutcome {
        details: balance_details(&data),
        ..outcome(ResultArea::Balance, OutcomeStatus::Success, message)
    }
}

pub fn balance_updated(envelope: ApiEnvelope<BalanceData>) -> FormOutcome {
    if !envelope.success {
        return application_failure(ResultArea::Balance, &envelope, "Update failed");
    }
    let data = envelope.data.unwrap_or_default();
    FormOutcome {
        details: balance_details(&data),
        ..outcome(
            ResultArea::Balance,
            OutcomeStatus::Success,
            "Balance updated".to_owned(),
        )
    }
}

pub fn password_verified(envelope: ApiEnvelope<serde_json::Value>) -> FormOutcome {
    if !envelope.success {
        return application_failure(ResultArea::Password, &envelope, "Password verification failed");
    }
    let message = envelope
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Password is correct".to_owned());
    outcome(ResultArea::Password, OutcomeStatus::Success, message)
}

pub fn password_updated(envelope: ApiEnvelope<serde_json::Value>) -> FormOutcome {
    if !envelope.success {
        return application_failure(ResultArea::Password, &envelope, "Password update failed");
    }
    let message = envelope
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Password updated".to_owned());
    outcome(ResultArea::Password, OutcomeStatus::Success, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_store::ConfigKind;
    use crate::messages::{NETWORK_ERROR, SYSTEM_BUSY, USER_NOT_FOUND};

    fn nacos(server: &str, namespace: &str) -> StoredConfig {
        StoredConfig {
            kind: ConfigKind::Nacos,
            data: ConfigPayload::nacos(server, namespace, "", ""),
            timestamp: 0,
        }
    }

    fn envelope<T>(success: bool, message: &str, data: Option<T>) -> ApiEnvelope<T> {
        ApiEnvelope {
            success,
            message: Some(message.to_owned()),
            data,
        }
    }

    #[test]
    fn balance_query_carries_configured_params_only() {
        let config = nacos("10.0.0.1", "");
        let req = balance_query("138 0000 0000", Some(&config)).unwrap();
        assert_eq!(
            req.query(),
            vec![
                ("phone", "13800000000".to_owned()),
                ("server_address", "10.0.0.1".to_owned()),
            ]
        );

        let bare = balance_query("13800000000", None).unwrap();
        assert_eq!(bare.query(), vec![("phone", "13800000000".to_owned())]);
    }

    #[test]
    fn ten_digit_phone_is_rejected_on_the_phone_field() {
        let err = balance_query("1380000000", None).unwrap_err();
        match err {
            Rejection::Invalid { field, message } => {
                assert_eq!(field, Field::BalancePhone);
                assert!(message.contains("Too few digits"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn balance_update_validates_amount() {
        let err = balance_update("13800000000", "ten", None).unwrap_err();
        assert!(matches!(
            err,
            Rejection::Invalid {
                field: Field::BalanceAmount,
                ..
            }
        ));
    }

    #[test]
    fn password_ops_need_a_server_address() {
        assert_eq!(
            password_verify("13800000000", "pw", None).unwrap_err(),
            Rejection::NacosNotConfigured
        );
        let empty = nacos("", "server");
        assert_eq!(
            password_update("13800000000", "pw", Some(&empty)).unwrap_err(),
            Rejection::NacosNotConfigured
        );

        let config = nacos("10.0.0.1", "");
        let req = password_update("13800000000", " new ", Some(&config)).unwrap();
        assert_eq!(req.new_password, "new");
        assert_eq!(req.connection.namespace.as_deref(), Some("server"));
        assert_eq!(req.connection.username.as_deref(), Some("nacos"));
    }

    #[test]
    fn empty_password_is_flagged_before_config_check() {
        let err = password_verify("13800000000", "  ", None).unwrap_err();
        assert!(matches!(
            err,
            Rejection::Invalid {
                field: Field::Password,
                ..
            }
        ));
    }

    #[test]
    fn config_form_requires_server() {
        let form = ConfigForm {
            server_address: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config_payload(&form),
            Err(Rejection::Invalid {
                field: Field::ServerAddress,
                ..
            })
        ));

        let form = ConfigForm {
            server_address: " 10.0.0.1:8848 ".into(),
            namespace: "server".into(),
            ..Default::default()
        };
        let payload = config_payload(&form).unwrap();
        assert_eq!(payload.server_address(), Some("10.0.0.1:8848"));
    }

    #[test]
    fn database_failure_reads_as_busy() {
        let shown = balance_queried(envelope(false, "database connection lost", None));
        assert_eq!(shown.status, OutcomeStatus::ApplicationFailed);
        assert_eq!(shown.message, SYSTEM_BUSY);

        let shown = balance_updated(envelope(false, "用户不存在", None));
        assert_eq!(shown.message, USER_NOT_FOUND);
    }

    #[test]
    fn balance_success_lists_fields() {
        let data = BalanceData {
            balance: Some(serde_json::Number::from(42)),
            encrypt: Some("abc".into()),
            environment: Some("production".into()),
            server_info: None,
        };
        let shown = balance_queried(envelope(true, "", Some(data)));
        assert!(shown.is_success());
        assert_eq!(shown.message, "Current balance: 42");
        assert_eq!(shown.detail("Environment"), Some("production"));
        assert_eq!(shown.detail("Server"), None);
    }

    #[test]
    fn transport_failures_are_generic() {
        let shown = failed(ResultArea::Password, &AdminError::Network("reset".into()));
        assert_eq!(shown.status, OutcomeStatus::TransportFailed);
        assert_eq!(shown.message, NETWORK_ERROR);
    }

    #[test]
    fn password_messages_pass_through() {
        let ok = password_verified(envelope(true, "Password matches", None));
        assert_eq!(ok.message, "Password matches");
        let bad = password_verified(envelope(false, "Wrong password", None));
        assert_eq!(bad.status, OutcomeStatus::ApplicationFailed);
        assert_eq!(bad.message, "Wrong password");
    }
}
