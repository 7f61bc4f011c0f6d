//! Toast notifications.

use ba_admin_core::view::{Notifier, ToastLevel};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom;

const VISIBLE_MS: u32 = 3_000;
const FADE_MS: u32 = 300;

/// Appends toasts to `#toastContainer`; each removes itself after
/// `VISIBLE_MS` plus a `FADE_MS` fade-out.
pub struct ToastNotifier {
    container: Element,
}

impl ToastNotifier {
    pub fn new(container: Element) -> Self {
        Self { container }
    }

    fn render(&self, level: ToastLevel, message: &str) -> Result<(), JsValue> {
        let toast = dom::create_element("div")?;
        toast.set_class_name(&format!("toast toast-{} fade-in", level.as_str()));

        let icon = match level {
            ToastLevel::Success => "bi bi-check-circle",
            ToastLevel::Error => "bi bi-exclamation-circle",
            ToastLevel::Warning => "bi bi-exclamation-triangle",
            ToastLevel::Info => "bi bi-info-circle",
        };
        let icon_box = dom::create_element("div")?;
        icon_box.set_class_name("toast-icon");
        icon_box.append_child(&dom::text_element("i", icon, "")?.into())?;
        toast.append_child(&icon_box)?;
        toast.append_child(&dom::text_element("div", "toast-message", message)?.into())?;

        let close = dom::text_element("button", "toast-close", "\u{00d7}")?;
        {
            let toast = toast.clone();
            let cb = Closure::once_into_js(move |_: web_sys::MouseEvent| toast.remove());
            close.add_event_listener_with_callback("click", cb.unchecked_ref())?;
        }
        toast.append_child(&close)?;
        self.container.append_child(&toast)?;

        Timeout::new(VISIBLE_MS, move || {
            dom::add_class(&toast, "fade-out");
            Timeout::new(FADE_MS, move || toast.remove()).forget();
        })
        .forget();
        Ok(())
    }
}

impl Notifier for ToastNotifier {
    fn toast(&self, level: ToastLevel, message: &str) {
        if let Err(e) = self.render(level, message) {
            tracing::warn!(error = ?e, %message, "failed to render toast");
        }
    }
}
