//! Balance admin page, Rust + WASM frontend.
//!
//! The page logic lives in `ba-admin-core`; this crate supplies its browser
//! seams (`fetch`, `localStorage`, the DOM) and wires the listeners.

pub mod api;
pub mod dom;
pub mod dropdown;
pub mod events;
pub mod logging;
pub mod state;
pub mod toast;
pub mod view;

use std::rc::Rc;

use ba_admin_core::{AdminSession, SessionDeps};
use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let dropdown = dropdown::ServerDropdown::new(els.clone());
    let session = Rc::new(AdminSession::new(SessionDeps {
        slots: Rc::new(state::LocalStorageSlotStore),
        transport: Rc::new(api::FetchTransport),
        view: Rc::new(view::DomView::new(els.clone(), dropdown.clone())),
        notifier: Rc::new(toast::ToastNotifier::new(els.toast_container.clone())),
        clock: Rc::new(state::JsClock),
    }));

    dropdown.mount(session.clone())?;
    events::bind_events(&els, &session, &dropdown)?;

    session
        .init()
        .await
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    tracing::info!(base_url = %api::base_url(), "admin page ready");
    Ok(())
}
