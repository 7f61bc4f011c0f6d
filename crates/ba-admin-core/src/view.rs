//! Presentation seams. The browser renders these into the DOM, the CLI
//! prints them.

use ba_api_types::NacosServerOption;

use crate::config_store::{ConfigPayload, StoredConfig};
use crate::gateway_cache::DomainDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastLevel::Success => "success",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        }
    }
}

pub trait Notifier {
    fn toast(&self, level: ToastLevel, message: &str);
}

/// Which result panel an outcome is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultArea {
    Balance,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    ValidationFailed,
    /// HTTP status, network, timeout or undecodable body.
    TransportFailed,
    /// The backend answered with `success: false`.
    ApplicationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    pub area: ResultArea,
    pub status: OutcomeStatus,
    pub message: String,
    /// Label/value rows shown under the message.
    pub details: Vec<(String, String)>,
}

impl FormOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn detail(&self, label: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerOptionsView {
    Loading,
    Empty,
    /// Already sorted newest first.
    Items(Vec<NacosServerOption>),
    Failed(String),
}

/// Inputs that can be flagged as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BalancePhone,
    BalanceAmount,
    PasswordPhone,
    Password,
    ServerAddress,
    Environment,
}

/// User actions with a pending indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    QueryBalance,
    UpdateBalance,
    VerifyPassword,
    UpdatePassword,
    SaveConfig,
    SwitchEnvironment,
}

impl Action {
    pub fn area(self) -> Option<ResultArea> {
        match self {
            Action::QueryBalance | Action::UpdateBalance => Some(ResultArea::Balance),
            Action::VerifyPassword | Action::UpdatePassword => Some(ResultArea::Password),
            Action::SaveConfig | Action::SwitchEnvironment => None,
        }
    }
}

pub trait AdminView {
    fn show_config_status(&self, config: &StoredConfig);
    fn show_domain(&self, display: &DomainDisplay);
    fn show_outcome(&self, outcome: &FormOutcome);
    fn show_server_options(&self, options: &ServerOptionsView);
    fn open_config_modal(&self, current: Option<&ConfigPayload>);
    fn close_config_modal(&self);
    fn clear_password_input(&self);
    fn flag_invalid_field(&self, field: Field);
    fn set_busy(&self, action: Action, busy: bool);
}
