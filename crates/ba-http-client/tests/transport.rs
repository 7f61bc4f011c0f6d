use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use axum::extract::{Form, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use ba_admin_core::api::AdminApi;
use ba_admin_core::error::AdminError;
use ba_admin_core::transport::{ApiRequest, ApiTransport};
use ba_api_types::{BalanceQueryRequest, BalanceUpdateRequest, ConnectionParams};
use ba_http_client::ReqwestTransport;
use serde_json::{Value, json};

async fn get_balance(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "balance": 42,
            "server_info": params.get("server_address").cloned().unwrap_or_default(),
        }
    }))
}

async fn update_balance(
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    Json(json!({
        "success": form.get("phone").is_some_and(|p| p.len() == 11),
        "data": {
            "balance": form.get("balance").and_then(|b| b.parse::<f64>().ok()),
            "environment": query.get("namespace").cloned().unwrap_or_default(),
        }
    }))
}

async fn save_config(Json(body): Json<Value>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({ "success": body["server_addresses"].is_string() }))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/get_balance", get(get_balance))
        .route("/update_balance", post(update_balance))
        .route("/save_nacos_config", post(save_config))
        .route("/get_nacos_configs", get(broken));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn connection() -> ConnectionParams {
    ConnectionParams {
        server_address: Some("10.0.0.1:8848".into()),
        namespace: Some("server".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn query_params_reach_the_backend() {
    let base = spawn_stub().await;
    let api = AdminApi::new(Rc::new(ReqwestTransport::new(Some(base))));

    let resp = api
        .get_balance(&BalanceQueryRequest {
            phone: "13800000000".into(),
            connection: connection(),
        })
        .await
        .unwrap();

    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data.balance.unwrap().as_i64(), Some(42));
    assert_eq!(data.server_info.as_deref(), Some("10.0.0.1:8848"));
}

#[tokio::test]
async fn form_body_is_urlencoded() {
    let base = spawn_stub().await;
    let api = AdminApi::new(Rc::new(ReqwestTransport::new(Some(base))));

    let resp = api
        .update_balance(&BalanceUpdateRequest {
            phone: "13800000000".into(),
            balance: "12.5".into(),
            connection: connection(),
        })
        .await
        .unwrap();

    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data.balance.unwrap().as_f64(), Some(12.5));
    assert_eq!(data.environment.as_deref(), Some("server"));
}

#[tokio::test]
async fn server_errors_surface_as_status() {
    let base = spawn_stub().await;
    let api = AdminApi::new(Rc::new(ReqwestTransport::new(Some(base))));
    assert!(matches!(
        api.get_nacos_configs().await,
        Err(AdminError::Http { status: 500 })
    ));
}

#[tokio::test]
async fn elapsed_timeout_is_reported() {
    let base = spawn_stub().await;
    let transport = ReqwestTransport::new(Some(base));
    let request = ApiRequest::post_json("/save_nacos_config", r#"{"server_addresses":"x"}"#.into())
        .with_timeout(Duration::from_millis(50));
    assert!(matches!(
        transport.execute(request).await,
        Err(AdminError::Timeout)
    ));
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ReqwestTransport::new(Some(format!("http://{addr}")));
    assert!(matches!(
        transport.execute(ApiRequest::get("/get_balance")).await,
        Err(AdminError::Network(_))
    ));
}
