//! HTTP transport over `fetch`.
//!
//! `base_url()` honours the optional `#baseUrl` input and falls back to the
//! page origin. Requests carrying a timeout race a `gloo-timers` timer.

use std::pin::pin;

use async_trait::async_trait;
use ba_admin_core::error::{AdminError, Result};
use ba_admin_core::transport::{ApiRequest, ApiResponse, ApiTransport, RequestBody};
use ba_api_types::Pairs;
use futures_util::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response, UrlSearchParams};

use crate::dom;

/// Determine the API base URL.
///
/// Priority: user-supplied `#baseUrl` input → same origin.
pub fn base_url() -> String {
    if let Some(input) = dom::by_id_typed::<web_sys::HtmlInputElement>("baseUrl") {
        let v = input.value().trim().to_string();
        if !v.is_empty() {
            return v.trim_end_matches('/').to_string();
        }
    }
    dom::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

fn js_error(e: JsValue) -> AdminError {
    AdminError::Network(format!("{:?}", e))
}

fn search_params(pairs: &Pairs) -> Result<UrlSearchParams> {
    let params = UrlSearchParams::new().map_err(js_error)?;
    for (name, value) in pairs {
        params.append(name, value);
    }
    Ok(params)
}

async fn fetch(request: &ApiRequest) -> Result<ApiResponse> {
    let mut url = format!("{}{}", base_url(), request.path);
    if !request.query.is_empty() {
        let query: String = search_params(&request.query)?.to_string().into();
        url.push('?');
        url.push_str(&query);
    }

    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::Cors);

    let headers = Headers::new().map_err(js_error)?;
    match &request.body {
        RequestBody::Empty => {}
        // URLSearchParams bodies set the urlencoded content type themselves.
        RequestBody::Form(pairs) => opts.set_body(&search_params(pairs)?.into()),
        RequestBody::Json(json) => {
            headers
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
            opts.set_body(&JsValue::from_str(json));
        }
    }
    opts.set_headers(&headers);

    let req = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
    let window = dom::window().ok_or_else(|| AdminError::Network("no window".into()))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(js_error)?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| AdminError::Decode("response is not a Response".into()))?;

    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    Ok(ApiResponse {
        status: resp.status(),
        body: text.as_string().unwrap_or_default(),
    })
}

pub struct FetchTransport;

#[async_trait(?Send)]
impl ApiTransport for FetchTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let Some(timeout) = request.timeout else {
            return fetch(&request).await;
        };
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let call = pin!(fetch(&request));
        let timer = pin!(TimeoutFuture::new(millis));
        match select(call, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                tracing::warn!(path = request.path, "request timed out");
                Err(AdminError::Timeout)
            }
        }
    }
}
