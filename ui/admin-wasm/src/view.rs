//! DOM rendering of the core's view seam.

use std::rc::Rc;

use ba_admin_core::config_store::{ConfigKind, ConfigPayload, StoredConfig};
use ba_admin_core::gateway_cache::DomainDisplay;
use ba_admin_core::validation::{PhoneHint, phone_hint};
use ba_admin_core::view::{
    Action, AdminView, Field, FormOutcome, OutcomeStatus, ResultArea, ServerOptionsView,
};
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlInputElement};

use crate::dom::{self, Elements};
use crate::dropdown::ServerDropdown;

const FLAG_MS: u32 = 3_000;

pub struct DomView {
    els: Elements,
    dropdown: Rc<ServerDropdown>,
}

impl DomView {
    pub fn new(els: Elements, dropdown: Rc<ServerDropdown>) -> Self {
        Self { els, dropdown }
    }

    fn result_el(&self, area: ResultArea) -> &Element {
        match area {
            ResultArea::Balance => &self.els.result,
            ResultArea::Password => &self.els.password_result,
        }
    }

    fn field_input(&self, field: Field) -> Option<&HtmlInputElement> {
        match field {
            Field::BalancePhone => Some(&self.els.phone),
            Field::BalanceAmount => Some(&self.els.balance),
            Field::PasswordPhone => Some(&self.els.phone_password),
            Field::Password => Some(&self.els.password),
            Field::ServerAddress => Some(&self.els.server_addresses),
            Field::Environment => None,
        }
    }

    fn action_button(&self, action: Action) -> Option<&Element> {
        match action {
            Action::QueryBalance => Some(element(&self.els.query_balance_btn)),
            Action::UpdateBalance => Some(element(&self.els.update_balance_btn)),
            Action::VerifyPassword => Some(element(&self.els.verify_password_btn)),
            Action::UpdatePassword => Some(element(&self.els.update_password_btn)),
            Action::SaveConfig => Some(element(&self.els.save_config_btn)),
            Action::SwitchEnvironment => self.els.environment_select.as_ref().map(element),
        }
    }

    fn render_outcome(&self, outcome: &FormOutcome) -> Result<(), JsValue> {
        let el = self.result_el(outcome.area);
        let tone = match outcome.status {
            OutcomeStatus::Success => "success",
            _ => "error",
        };
        el.set_class_name(&format!("result {tone} fade-enter"));
        el.set_inner_html("");
        el.append_child(&dom::text_element("h3", "", &outcome.message)?.into())?;
        for (label, value) in &outcome.details {
            el.append_child(&dom::text_element("p", "", &format!("{label}: {value}"))?.into())?;
        }
        Ok(())
    }
}

fn element<T: AsRef<Element>>(el: &T) -> &Element {
    el.as_ref()
}

/// Border state of a phone input while the user types.
pub fn hint_phone(input: &HtmlInputElement) {
    let el: &Element = input.as_ref();
    let hint = phone_hint(&input.value());
    dom::toggle_class(el, "is-valid", hint == PhoneHint::Valid);
    dom::toggle_class(el, "is-partial", hint == PhoneHint::Partial);
    dom::toggle_class(el, "is-invalid", hint == PhoneHint::Invalid);
}

impl AdminView for DomView {
    fn show_config_status(&self, config: &StoredConfig) {
        dom::set_text(&self.els.config_status, &config.status_text());
        let connected = match config.kind {
            ConfigKind::Nacos => config.data.server_address().is_some(),
            _ => config.data.env_name.is_some(),
        };
        dom::toggle_class(&self.els.config_badge, "connected", connected);
        dom::toggle_class(&self.els.config_badge, "disconnected", !connected);
    }

    fn show_domain(&self, display: &DomainDisplay) {
        let el = &self.els.current_domain;
        dom::set_text(el, &display.text());
        dom::toggle_class(el, "loading", display.is_loading());
        match display.tooltip() {
            Some(tip) => {
                let _ = el.set_attribute("title", &tip);
            }
            None => {
                let _ = el.remove_attribute("title");
            }
        }
    }

    fn show_outcome(&self, outcome: &FormOutcome) {
        if let Err(e) = self.render_outcome(outcome) {
            tracing::warn!(error = ?e, "failed to render outcome");
        }
    }

    fn show_server_options(&self, options: &ServerOptionsView) {
        self.dropdown.render(options);
    }

    fn open_config_modal(&self, current: Option<&ConfigPayload>) {
        if let Some(data) = current {
            self.els
                .server_addresses
                .set_value(data.server_address().unwrap_or_default());
            self.els
                .namespace
                .set_value(data.namespace.as_deref().unwrap_or_default());
            self.els
                .username
                .set_value(data.username.as_deref().unwrap_or_default());
            self.els
                .nacos_password
                .set_value(data.password.as_deref().unwrap_or_default());
        }
        dom::add_class(&self.els.config_modal, "show");
    }

    fn close_config_modal(&self) {
        dom::remove_class(&self.els.config_modal, "show");
    }

    fn clear_password_input(&self) {
        self.els.password.set_value("");
    }

    fn flag_invalid_field(&self, field: Field) {
        let Some(input) = self.field_input(field) else {
            return;
        };
        let el: Element = input.clone().into();
        dom::add_class(&el, "is-invalid");
        let _ = input.focus();
        Timeout::new(FLAG_MS, move || dom::remove_class(&el, "is-invalid")).forget();
    }

    fn set_busy(&self, action: Action, busy: bool) {
        if let Some(button) = self.action_button(action) {
            dom::set_disabled(button, busy);
            dom::toggle_class(button, "loading", busy);
        }
    }
}
