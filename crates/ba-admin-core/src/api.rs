//! Typed client for the backend endpoints.

use std::rc::Rc;
use std::time::Duration;

use ba_api_types::{
    ApiEnvelope, BalanceData, BalanceQueryRequest, BalanceUpdateRequest, EnvironmentSwitchResponse,
    GET_BALANCE, GET_GATEWAY_URL, GET_NACOS_CONFIGS, GatewayLookupRequest, GatewayUrlResponse,
    NacosConfigList, NacosServerOption, PasswordUpdateRequest, PasswordVerifyRequest,
    SAVE_NACOS_CONFIG, SET_ENVIRONMENT, SaveNacosConfigRequest, UPDATE_BALANCE, UPDATE_PASSWORD,
    VERIFY_PASSWORD,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AdminError, Result};
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

pub const SAVE_CONFIG_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AdminApi {
    transport: Rc<dyn ApiTransport>,
}

/// Non-2xx is a generic failure; the body is not inspected.
fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T> {
    if !response.is_success() {
        return Err(AdminError::Http {
            status: response.status,
        });
    }
    Ok(serde_json::from_str(&response.body)?)
}

impl AdminApi {
    pub fn new(transport: Rc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        debug!(method = request.method.as_str(), path = request.path, "api request");
        let response = self.transport.execute(request).await?;
        decode(response)
    }

    pub async fn get_balance(&self, req: &BalanceQueryRequest) -> Result<ApiEnvelope<BalanceData>> {
        self.call(ApiRequest::get(GET_BALANCE).with_query(req.query()))
            .await
    }

    pub async fn update_balance(
        &self,
        req: &BalanceUpdateRequest,
    ) -> Result<ApiEnvelope<BalanceData>> {
        self.call(ApiRequest::post_form(UPDATE_BALANCE, req.form()).with_query(req.query()))
            .await
    }

    pub async fn verify_password(
        &self,
        req: &PasswordVerifyRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>> {
        self.call(ApiRequest::post_form(VERIFY_PASSWORD, req.form()).with_query(req.query()))
            .await
    }

    pub async fn update_password(
        &self,
        req: &PasswordUpdateRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>> {
        self.call(ApiRequest::post_form(UPDATE_PASSWORD, req.form()).with_query(req.query()))
            .await
    }

    pub async fn save_nacos_config(
        &self,
        req: &SaveNacosConfigRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>> {
        let body = serde_json::to_string(req)?;
        self.call(ApiRequest::post_json(SAVE_NACOS_CONFIG, body).with_timeout(SAVE_CONFIG_TIMEOUT))
            .await
    }

    pub async fn get_nacos_configs(&self) -> Result<Vec<NacosServerOption>> {
        let list: NacosConfigList = self.call(ApiRequest::get(GET_NACOS_CONFIGS)).await?;
        Ok(list.into_options())
    }

    pub async fn get_gateway_url(&self, req: &GatewayLookupRequest) -> Result<GatewayUrlResponse> {
        self.call(ApiRequest::get(GET_GATEWAY_URL).with_query(req.query()))
            .await
    }

    pub async fn set_environment(&self, environment: &str) -> Result<EnvironmentSwitchResponse> {
        self.call(ApiRequest::post_form(
            SET_ENVIRONMENT,
            vec![("environment", environment.to_owned())],
        ))
        .await
    }
}
