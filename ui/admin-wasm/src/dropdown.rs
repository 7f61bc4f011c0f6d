//! Server address dropdown of the config modal.
//!
//! Listeners are owned by the dropdown and detached on `unmount()` (or drop),
//! so a torn-down page leaves nothing bound to the document.

use std::cell::RefCell;
use std::rc::Rc;

use ba_admin_core::AdminSession;
use ba_admin_core::server_options::{
    address, env_badge_color, env_label, matches_filter, namespace_label, title,
};
use ba_admin_core::view::ServerOptionsView;
use ba_api_types::NacosServerOption;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget};

use crate::dom::{self, Elements};

const ITEM_CLASS: &str = "server-option";

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

pub struct ServerDropdown {
    els: Elements,
    options: RefCell<Vec<NacosServerOption>>,
    listeners: RefCell<Vec<Listener>>,
}

impl ServerDropdown {
    pub fn new(els: Elements) -> Rc<Self> {
        Rc::new(Self {
            els,
            options: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn listen(
        &self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    /// Attach listeners. Mounting twice replaces the earlier set.
    pub fn mount(self: &Rc<Self>, session: Rc<AdminSession>) -> Result<(), JsValue> {
        self.unmount();
        let input: &EventTarget = self.els.server_addresses.as_ref();

        // Refresh on every open.
        let weak = Rc::downgrade(self);
        self.listen(input, "focus", move |_| {
            let Some(this) = weak.upgrade() else { return };
            this.set_open(true);
            let session = session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = session.load_server_options().await {
                    tracing::debug!(error = %err, "server list not refreshed");
                }
            });
        })?;

        let weak = Rc::downgrade(self);
        self.listen(input, "input", move |_| {
            if let Some(this) = weak.upgrade() {
                this.set_open(true);
                this.render_items();
            }
        })?;

        let weak = Rc::downgrade(self);
        self.listen(input, "keydown", move |e| {
            let escape = e
                .dyn_ref::<web_sys::KeyboardEvent>()
                .is_some_and(|k| k.key() == "Escape");
            if let (true, Some(this)) = (escape, weak.upgrade()) {
                this.set_open(false);
            }
        })?;

        let weak = Rc::downgrade(self);
        self.listen(self.els.server_dropdown.as_ref(), "click", move |e| {
            let Some(this) = weak.upgrade() else { return };
            let item = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("li.{ITEM_CLASS}[data-address]")).ok().flatten());
            if let Some(addr) = item.and_then(|li| li.get_attribute("data-address")) {
                this.els.server_addresses.set_value(&addr);
                this.set_open(false);
            }
        })?;

        // Click anywhere else closes the list.
        if let Some(document) = dom::document() {
            let weak = Rc::downgrade(self);
            self.listen(document.as_ref(), "click", move |e| {
                let Some(this) = weak.upgrade() else { return };
                let Some(node) = e.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok()) else {
                    return;
                };
                let inside = this.els.server_dropdown.contains(Some(&node))
                    || this.els.server_addresses.contains(Some(&node));
                if !inside {
                    this.set_open(false);
                }
            })?;
        }
        Ok(())
    }

    /// Detach every listener.
    pub fn unmount(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn set_open(&self, open: bool) {
        dom::toggle_class(&self.els.server_dropdown, "show", open);
    }

    fn clear_items(&self) {
        let Ok(items) = self
            .els
            .server_dropdown
            .query_selector_all(&format!("li.{ITEM_CLASS}"))
        else {
            return;
        };
        for i in 0..items.length() {
            if let Some(el) = items.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                el.remove();
            }
        }
    }

    pub fn render(&self, view: &ServerOptionsView) {
        let loading = &self.els.dropdown_loading;
        match view {
            ServerOptionsView::Loading => {
                dom::set_text(loading, "Loading...");
                dom::remove_class(loading, "text-danger");
                dom::remove_class(loading, "d-none");
                self.clear_items();
            }
            ServerOptionsView::Failed(message) => {
                dom::set_text(loading, message);
                dom::add_class(loading, "text-danger");
                dom::remove_class(loading, "d-none");
            }
            ServerOptionsView::Empty => {
                dom::add_class(loading, "d-none");
                self.options.borrow_mut().clear();
                self.render_items();
            }
            ServerOptionsView::Items(options) => {
                dom::add_class(loading, "d-none");
                *self.options.borrow_mut() = options.clone();
                self.render_items();
            }
        }
    }

    fn render_items(&self) {
        self.clear_items();
        if let Err(e) = self.append_items() {
            tracing::warn!(error = ?e, "failed to render server options");
        }
    }

    fn append_items(&self) -> Result<(), JsValue> {
        let filter = self.els.server_addresses.value();
        let options = self.options.borrow();
        let visible: Vec<&NacosServerOption> =
            options.iter().filter(|o| matches_filter(o, &filter)).collect();

        if options.is_empty() {
            let li = dom::text_element(
                "li",
                &format!("{ITEM_CLASS} dropdown-item text-muted text-center"),
                "No saved configs",
            )?;
            self.els.server_dropdown.append_child(&li)?;
            return Ok(());
        }

        for option in visible {
            let Some(addr) = address(option) else { continue };
            let li = dom::create_element("li")?;
            li.set_class_name(&format!(
                "{ITEM_CLASS} dropdown-item d-flex justify-content-between align-items-center"
            ));
            li.set_attribute("data-address", addr)?;

            let text = dom::create_element("div")?;
            text.append_child(&dom::text_element("strong", "", title(option))?.into())?;
            text.append_child(&dom::text_element(
                "div",
                "text-sm text-muted",
                namespace_label(option),
            )?.into())?;
            li.append_child(&text)?;

            let badge_class = format!("badge bg-{}", env_badge_color(option.env.as_deref()));
            li.append_child(&dom::text_element("span", &badge_class, env_label(option))?.into())?;

            self.els.server_dropdown.append_child(&li)?;
        }
        Ok(())
    }
}
