//! HTTP transport seam.
//!
//! The core describes requests as plain data; the browser build executes them
//! with `fetch`, native hosts with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use ba_api_types::Pairs;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Pairs),
    /// `application/json`
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub query: Pairs,
    pub body: RequestBody,
    /// Only the config-save call sets this; everything else relies on the
    /// platform default.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn post_form(path: &'static str, form: Pairs) -> Self {
        Self {
            method: Method::Post,
            path,
            query: Vec::new(),
            body: RequestBody::Form(form),
            timeout: None,
        }
    }

    pub fn post_json(path: &'static str, json: String) -> Self {
        Self {
            method: Method::Post,
            path,
            query: Vec::new(),
            body: RequestBody::Json(json),
            timeout: None,
        }
    }

    pub fn with_query(mut self, query: Pairs) -> Self {
        self.query = query;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a query parameter by name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a form field by name.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// Raw response: status and body text, nothing decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request. Implementations map connection failures to
/// `AdminError::Network` and an elapsed `timeout` to `AdminError::Timeout`.
/// They never retry.
#[async_trait(?Send)]
pub trait ApiTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}
