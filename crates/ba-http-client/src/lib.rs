use async_trait::async_trait;
use ba_admin_core::error::{AdminError, Result};
use ba_admin_core::transport::{ApiRequest, ApiResponse, ApiTransport, Method, RequestBody};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Native HTTP transport for the admin backend.
///
/// Reads `BALANCE_ADMIN_URL` from environment at construction time
/// (default: `http://localhost:5000`).
pub struct ReqwestTransport {
    base_url: String,
    http: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReqwestTransport {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .or_else(|| std::env::var("BALANCE_ADMIN_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(err: reqwest::Error) -> AdminError {
    if err.is_timeout() {
        AdminError::Timeout
    } else {
        AdminError::Network(err.to_string())
    }
}

#[async_trait(?Send)]
impl ApiTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Json(json) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json),
        };
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        debug!(path = request.path, status, "backend responded");
        Ok(ApiResponse { status, body })
    }
}
