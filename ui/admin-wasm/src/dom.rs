//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement};

// ── Helpers ──

pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(nl) = document().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..nl.length())
        .filter_map(|i| nl.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()
        .ok_or_else(|| JsValue::from_str("no document"))?
        .create_element(tag)
}

/// Create `<tag class="..">text</tag>`. Text is set as text content, never parsed.
pub fn text_element(tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let el = create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    el.set_text_content(Some(text));
    Ok(el)
}

pub fn set_disabled(el: &Element, disabled: bool) {
    if disabled {
        let _ = el.set_attribute("disabled", "");
    } else {
        let _ = el.remove_attribute("disabled");
    }
}

// ── Elements struct ──

/// All DOM element references used by the admin page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Header
    pub base_url: Option<HtmlInputElement>,
    pub current_domain: Element,
    pub config_status: Element,
    pub config_badge: Element,
    pub config_btn: HtmlElement,
    pub environment_select: Option<HtmlSelectElement>,

    // Tabs
    pub tabs: Vec<Element>,
    pub panels: Vec<Element>,

    // Balance
    pub balance_form: Element,
    pub phone: HtmlInputElement,
    pub balance: HtmlInputElement,
    pub query_balance_btn: HtmlElement,
    pub update_balance_btn: HtmlElement,
    pub result: Element,

    // Password
    pub phone_password: HtmlInputElement,
    pub password: HtmlInputElement,
    pub verify_password_btn: HtmlElement,
    pub update_password_btn: HtmlElement,
    pub password_result: Element,

    // Config modal
    pub config_modal: Element,
    pub close_modal_btn: Option<Element>,
    pub nacos_form: Element,
    pub server_addresses: HtmlInputElement,
    pub namespace: HtmlInputElement,
    pub username: HtmlInputElement,
    pub nacos_password: HtmlInputElement,
    pub save_config_btn: HtmlElement,
    pub advanced_toggle: Option<Element>,
    pub advanced_options: Element,
    pub server_dropdown: Element,
    pub dropdown_loading: Element,

    // Toasts
    pub toast_container: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            base_url: by_id_typed::<HtmlInputElement>("baseUrl"),
            current_domain: get_el!("currentDomain"),
            config_status: get_el!("configStatus"),
            config_badge: get_el!("configBadge"),
            config_btn: get_html!("configBtn"),
            environment_select: by_id_typed::<HtmlSelectElement>("environmentSelect"),

            tabs: query_all(".nav-tab"),
            panels: query_all(".tab-content"),

            balance_form: get_el!("balanceForm"),
            phone: get_input!("phone"),
            balance: get_input!("balance"),
            query_balance_btn: get_html!("queryBalanceBtn"),
            update_balance_btn: get_html!("updateBalanceBtn"),
            result: get_el!("result"),

            phone_password: get_input!("phonePassword"),
            password: get_input!("password"),
            verify_password_btn: get_html!("verifyPasswordBtn"),
            update_password_btn: get_html!("updatePasswordBtn"),
            password_result: get_el!("passwordResult"),

            config_modal: get_el!("configModal"),
            close_modal_btn: by_id("closeConfigModal"),
            nacos_form: get_el!("nacosForm"),
            server_addresses: get_input!("server_addresses"),
            namespace: get_input!("namespace"),
            username: get_input!("username"),
            nacos_password: get_input!("nacosPassword"),
            save_config_btn: get_html!("saveConfigBtn"),
            advanced_toggle: by_id("advancedToggle"),
            advanced_options: get_el!("advancedOptions"),
            server_dropdown: get_el!("serverAddressesDropdown"),
            dropdown_loading: get_el!("dropdownLoading"),

            toast_container: get_el!("toastContainer"),
        })
    }
}
