//! Terminal rendering of the session's view and toasts.

use std::cell::RefCell;
use std::io::Write;

use ba_admin_core::config_store::{ConfigPayload, StoredConfig};
use ba_admin_core::gateway_cache::DomainDisplay;
use ba_admin_core::server_options::{address, env_label, matches_filter, namespace_label, title};
use ba_admin_core::view::{
    Action, AdminView, Field, FormOutcome, Notifier, ServerOptionsView, ToastLevel,
};
use tracing::debug;

pub struct ConsoleView<W: Write> {
    out: RefCell<W>,
    filter: Option<String>,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W, filter: Option<String>) -> Self {
        Self {
            out: RefCell::new(out),
            filter,
        }
    }

    fn line(&self, text: &str) {
        let _ = writeln!(self.out.borrow_mut(), "{text}");
    }
}

impl ConsoleView<Vec<u8>> {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }
}

impl<W: Write> AdminView for ConsoleView<W> {
    fn show_config_status(&self, config: &StoredConfig) {
        self.line(&format!("config: {}", config.status_text()));
    }

    fn show_domain(&self, display: &DomainDisplay) {
        if display.is_loading() {
            return;
        }
        self.line(&format!("gateway: {}", display.text()));
        if let DomainDisplay::Resolved {
            server_address: Some(server),
            ..
        } = display
        {
            self.line(&format!("  via {server}"));
        }
    }

    fn show_outcome(&self, outcome: &FormOutcome) {
        self.line(&outcome.message);
        for (label, value) in &outcome.details {
            self.line(&format!("  {label}: {value}"));
        }
    }

    fn show_server_options(&self, options: &ServerOptionsView) {
        match options {
            ServerOptionsView::Loading => {}
            ServerOptionsView::Empty => self.line("No saved configs"),
            ServerOptionsView::Failed(message) => self.line(&format!("server list: {message}")),
            ServerOptionsView::Items(items) => {
                let filter = self.filter.as_deref().unwrap_or_default();
                for option in items.iter().filter(|o| matches_filter(o, filter)) {
                    let Some(addr) = address(option) else { continue };
                    self.line(&format!(
                        "{addr}\t{}\t{}\t{}",
                        title(option),
                        namespace_label(option),
                        env_label(option)
                    ));
                }
            }
        }
    }

    fn open_config_modal(&self, _current: Option<&ConfigPayload>) {
        self.line("Run `balance-admin config set --server <address>` to configure Nacos");
    }

    fn close_config_modal(&self) {}

    fn clear_password_input(&self) {}

    fn flag_invalid_field(&self, field: Field) {
        debug!(?field, "invalid input");
    }

    fn set_busy(&self, action: Action, busy: bool) {
        debug!(?action, busy, "busy");
    }
}

/// Prints toasts as `[level] message`.
pub struct ConsoleNotifier<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }
}

impl ConsoleNotifier<Vec<u8>> {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn toast(&self, level: ToastLevel, message: &str) {
        let _ = writeln!(self.out.borrow_mut(), "[{}] {message}", level.as_str());
    }
}

/// Multi-line description of the stored config. The password is masked.
pub fn describe_config(config: &StoredConfig) -> String {
    let data = &config.data;
    let field = |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned();
    let password = match data.password.as_deref() {
        Some(p) if !p.is_empty() => "********".to_owned(),
        _ => "-".to_owned(),
    };
    let saved = chrono::DateTime::from_timestamp_millis(config.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| config.timestamp.to_string());
    [
        format!("type:      {}", config.kind.as_str()),
        format!("server:    {}", field(data.server_address())),
        format!("namespace: {}", field(data.namespace.as_deref())),
        format!("username:  {}", field(data.username.as_deref())),
        format!("password:  {password}"),
        format!("env:       {}", field(data.env_name.as_deref())),
        format!("saved:     {saved}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ba_admin_core::config_store::ConfigKind;
    use ba_api_types::NacosServerOption;

    fn option(addr: &str, env: &str) -> NacosServerOption {
        NacosServerOption {
            server_addresses: Some(addr.into()),
            env: Some(env.into()),
            ..Default::default()
        }
    }

    #[test]
    fn server_list_honours_filter() {
        let view = ConsoleView::new(Vec::new(), Some("10.0".into()));
        view.show_server_options(&ServerOptionsView::Items(vec![
            option("10.0.0.1:8848", "prod"),
            option("192.168.1.5:8848", "test"),
        ]));
        let out = view.output();
        assert!(out.contains("10.0.0.1:8848"));
        assert!(!out.contains("192.168.1.5"));
    }

    #[test]
    fn loading_states_print_nothing() {
        let view = ConsoleView::new(Vec::new(), None);
        view.show_server_options(&ServerOptionsView::Loading);
        view.show_domain(&DomainDisplay::Loading { cached: None });
        assert!(view.output().is_empty());
    }

    #[test]
    fn resolved_domain_names_its_server() {
        let view = ConsoleView::new(Vec::new(), None);
        view.show_domain(&DomainDisplay::Resolved {
            domain: "gw.example.com".into(),
            server_address: Some("10.0.0.1:8848".into()),
        });
        assert_eq!(view.output(), "gateway: gw.example.com\n  via 10.0.0.1:8848\n");
    }

    #[test]
    fn toasts_carry_their_level() {
        let notifier = ConsoleNotifier::new(Vec::new());
        notifier.toast(ToastLevel::Warning, "Enter a phone number");
        assert_eq!(notifier.output(), "[warning] Enter a phone number\n");
    }

    #[test]
    fn config_description_masks_password() {
        let config = StoredConfig {
            kind: ConfigKind::Nacos,
            data: ConfigPayload::nacos("10.0.0.1:8848", "server", "nacos", "secret"),
            timestamp: 0,
        };
        let text = describe_config(&config);
        assert!(text.contains("server:    10.0.0.1:8848"));
        assert!(text.contains("password:  ********"));
        assert!(!text.contains("secret"));
        assert!(text.contains("1970-01-01T00:00:00+00:00"));
    }
}
