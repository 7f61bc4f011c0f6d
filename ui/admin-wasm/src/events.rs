//! Event binding.
//!
//! Wires the page's listeners to [`AdminSession`]. Async handlers run via
//! `wasm_bindgen_futures::spawn_local`; the session reports their results
//! through the view, so handlers only log failures.

use std::rc::Rc;

use ba_admin_core::AdminSession;
use ba_admin_core::controllers::ConfigForm;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

use crate::dom::{self, Elements};
use crate::dropdown::ServerDropdown;
use crate::view::hint_phone;

const PASSWORD_TAB: &str = "password";

fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Attach an async handler `fn(&AdminSession, &Elements)` to an event.
macro_rules! on_async {
    ($target:expr, $kind:expr, $session:expr, $els:expr, $handler:expr) => {{
        let session = $session.clone();
        let els = $els.clone();
        listen($target.as_ref(), $kind, move |e: web_sys::Event| {
            if $kind == "submit" {
                e.prevent_default();
            }
            let session = session.clone();
            let els = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&session, &els).await;
            });
        })?;
    }};
}

/// Bind all UI event listeners. Call once after the session is built.
pub fn bind_events(
    els: &Elements,
    session: &Rc<AdminSession>,
    dropdown: &Rc<ServerDropdown>,
) -> Result<(), JsValue> {
    // ── Tabs ──
    for tab in &els.tabs {
        let tab_name = tab.get_attribute("data-tab").unwrap_or_default();
        let els2 = els.clone();
        listen(tab.as_ref(), "click", move |_| set_active_tab(&els2, &tab_name))?;
    }

    // ── Config modal ──
    on_async!(els.config_btn, "click", session, els, on_open_config);
    on_async!(els.nacos_form, "submit", session, els, on_save_config);
    if let Some(close) = &els.close_modal_btn {
        let modal = els.config_modal.clone();
        listen(close.as_ref(), "click", move |_| dom::remove_class(&modal, "show"))?;
    }
    {
        let modal = els.config_modal.clone();
        listen(els.config_modal.as_ref(), "click", move |e| {
            let on_backdrop = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .is_some_and(|t| t == modal);
            if on_backdrop {
                dom::remove_class(&modal, "show");
            }
        })?;
    }
    if let Some(toggle) = &els.advanced_toggle {
        let (toggle2, options) = (toggle.clone(), els.advanced_options.clone());
        listen(toggle.as_ref(), "click", move |_| {
            let open = !options.class_list().contains("show");
            dom::toggle_class(&options, "show", open);
            dom::toggle_class(&toggle2, "expanded", open);
        })?;
    }

    // ── Balance ──
    on_async!(els.query_balance_btn, "click", session, els, on_query_balance);
    on_async!(els.balance_form, "submit", session, els, on_update_balance);

    // ── Password ──
    on_async!(els.verify_password_btn, "click", session, els, on_verify_password);
    on_async!(els.update_password_btn, "click", session, els, on_update_password);

    // ── Phone hints ──
    for input in [&els.phone, &els.phone_password] {
        for kind in ["input", "blur"] {
            let input2 = input.clone();
            listen(input.as_ref(), kind, move |_| hint_phone(&input2))?;
        }
    }

    // ── Environment ──
    if let Some(select) = &els.environment_select {
        let (session, select2) = (session.clone(), select.clone());
        listen(select.as_ref(), "change", move |_| {
            let session = session.clone();
            let env = select2.value();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = session.switch_environment(&env).await {
                    tracing::warn!(error = %err, "environment switch not applied");
                }
            });
        })?;
    }

    // ── Lifecycle ──
    if let Some(window) = dom::window() {
        let (session, dropdown) = (session.clone(), dropdown.clone());
        listen(window.as_ref(), "pagehide", move |_| {
            session.teardown();
            dropdown.unmount();
        })?;
    }
    Ok(())
}

fn set_active_tab(els: &Elements, tab_name: &str) {
    for tab in &els.tabs {
        dom::toggle_class(tab, "active", tab.get_attribute("data-tab").as_deref() == Some(tab_name));
    }
    for panel in &els.panels {
        dom::toggle_class(panel, "active", panel.id() == tab_name);
    }
    if tab_name != PASSWORD_TAB {
        dom::add_class(&els.password_result, "d-none");
    }
}

async fn on_open_config(session: &AdminSession, _els: &Elements) {
    if let Err(err) = session.open_config().await {
        tracing::warn!(error = %err, "config modal not opened");
    }
}

async fn on_save_config(session: &AdminSession, els: &Elements) {
    let form = ConfigForm {
        server_address: dom::get_input_value(&els.server_addresses),
        namespace: dom::get_input_value(&els.namespace),
        username: dom::get_input_value(&els.username),
        password: dom::get_input_value(&els.nacos_password),
    };
    if let Err(err) = session.save_config_form(form).await {
        tracing::warn!(error = %err, "config not saved");
    }
}

async fn on_query_balance(session: &AdminSession, els: &Elements) {
    let phone = dom::get_input_value(&els.phone);
    if let Err(err) = session.query_balance(&phone).await {
        tracing::warn!(error = %err, "balance query not sent");
    }
}

async fn on_update_balance(session: &AdminSession, els: &Elements) {
    let phone = dom::get_input_value(&els.phone);
    let balance = dom::get_input_value(&els.balance);
    if let Err(err) = session.update_balance(&phone, &balance).await {
        tracing::warn!(error = %err, "balance update not sent");
    }
}

async fn on_verify_password(session: &AdminSession, els: &Elements) {
    let phone = dom::get_input_value(&els.phone_password);
    if let Err(err) = session.verify_password(&phone, &els.password.value()).await {
        tracing::warn!(error = %err, "password verification not sent");
    }
}

async fn on_update_password(session: &AdminSession, els: &Elements) {
    let phone = dom::get_input_value(&els.phone_password);
    if let Err(err) = session.update_password(&phone, &els.password.value()).await {
        tracing::warn!(error = %err, "password update not sent");
    }
}
