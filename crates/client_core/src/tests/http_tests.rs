use super::*;

use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use shared::{
    error::ApiErrorEnvelope,
    protocol::{TagTransactionParams, UntagTransactionParams},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::operation::summarize;

#[derive(Clone, Default)]
struct ServerState {
    seen_auth: Arc<Mutex<Vec<Option<String>>>>,
}

async fn tag_transaction(
    axum::extract::State(state): axum::extract::State<ServerState>,
    headers: HeaderMap,
    Json(params): Json<TagTransactionParams>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.seen_auth.lock().await.push(auth);
    Json(json!({ "tagged": params.transaction_id, "tag": params.body.name }))
}

async fn untag_transaction(Json(params): Json<UntagTransactionParams>) -> impl IntoResponse {
    (
        StatusCode::CONFLICT,
        Json(ApiErrorEnvelope::new(format!(
            "transaction {} is not tagged {}",
            params.transaction_id, params.name
        ))),
    )
}

async fn broken() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn echo(Json(body): Json<Value>) -> impl IntoResponse {
    Json(body)
}

async fn spawn_api() -> anyhow::Result<(String, ServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/tagTransaction", post(tag_transaction))
        .route("/api/untagTransaction", post(untag_transaction))
        .route("/api/broken", post(broken))
        .route("/api/noContent", post(no_content))
        .route("/api/echo", post(echo))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

#[tokio::test]
async fn posts_params_and_returns_json_body() {
    let (base_url, state) = spawn_api().await.expect("server");
    let client = HttpOperationClient::new(
        &base_url,
        Some("secret-token".to_string()),
        DEFAULT_REQUEST_TIMEOUT,
    )
    .expect("client");

    let result = client
        .invoke(
            "tagTransaction",
            Some(&json!({ "transaction_id": "t1", "body": { "name": "fishy" } })),
        )
        .await
        .expect("success");

    assert_eq!(result, json!({ "tagged": "t1", "tag": "fishy" }));
    assert_eq!(
        *state.seen_auth.lock().await,
        vec![Some("Bearer secret-token".to_string())]
    );
}

#[tokio::test]
async fn error_body_summary_is_reachable_through_context() {
    let (base_url, _) = spawn_api().await.expect("server");
    let client = HttpOperationClient::new(&base_url, None, DEFAULT_REQUEST_TIMEOUT).expect("client");

    let err = client
        .invoke(
            "untagTransaction",
            Some(&json!({ "transaction_id": "t1", "name": "fishy" })),
        )
        .await
        .expect_err("conflict");

    assert_eq!(err.summary(), Some("transaction t1 is not tagged fishy"));
    assert_eq!(
        err.context().and_then(|context| context.get("status")),
        Some(&json!(409))
    );
    assert!(err.to_string().starts_with("API error (409"));
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status_text() {
    let (base_url, _) = spawn_api().await.expect("server");
    let client = HttpOperationClient::new(&base_url, None, DEFAULT_REQUEST_TIMEOUT).expect("client");

    let err = client.invoke("broken", None).await.expect_err("bad gateway");
    assert_eq!(err.summary(), None);
    assert_eq!(summarize(&err), "API error (502 Bad Gateway)");
}

#[tokio::test]
async fn empty_success_body_is_null_and_missing_params_send_empty_object() {
    let (base_url, _) = spawn_api().await.expect("server");
    let client = HttpOperationClient::new(&base_url, None, DEFAULT_REQUEST_TIMEOUT).expect("client");

    assert_eq!(client.invoke("noContent", None).await.expect("ok"), Value::Null);
    assert_eq!(client.invoke("echo", None).await.expect("ok"), json!({}));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpOperationClient::new(
        &format!("http://{addr}"),
        None,
        Duration::from_secs(2),
    )
    .expect("client");
    let err = client.invoke("tagTransaction", None).await.expect_err("refused");
    assert!(matches!(err, RemoteError::Transport(_)));
}

#[test]
fn base_url_gets_trailing_slash_so_operations_append() {
    let client =
        HttpOperationClient::new("http://localhost:4000/api", None, DEFAULT_REQUEST_TIMEOUT)
            .expect("client");
    assert_eq!(client.base_url().as_str(), "http://localhost:4000/api/");
    assert_eq!(
        client.endpoint("tagTransaction").expect("url").as_str(),
        "http://localhost:4000/api/tagTransaction"
    );
}

#[test]
fn rejects_unparseable_base_url() {
    assert!(HttpOperationClient::new("not a url", None, DEFAULT_REQUEST_TIMEOUT).is_err());
}
