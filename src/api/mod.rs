// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::STATIC_DIR_ENV,
    ledger::TransactionRecord,
    models::{
        BalanceResponse, CreateWalletResponse, ExecuteTransferRequest, ExecuteTransferResponse,
        PrepareTransferRequest, PrepareTransferResponse, SignMessageRequest, SignMessageResponse,
        TransactionListResponse,
    },
    state::AppState,
};

pub mod health;
pub mod transfer;
pub mod wallet;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/wallet/create", post(wallet::create_wallet))
        .route("/wallet/{address}/balance", get(wallet::get_balance))
        .route(
            "/wallet/{address}/transactions",
            get(wallet::list_wallet_transactions),
        )
        .route("/transfer/prepare", post(transfer::prepare_transfer))
        .route("/transfer/sign", post(transfer::sign_message))
        .route("/transfer/execute", post(transfer::execute_transfer))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new(static_dir()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Directory served for the demo UI.
fn static_dir() -> String {
    env::var(STATIC_DIR_ENV).unwrap_or_else(|_| "static".to_string())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        wallet::create_wallet,
        wallet::get_balance,
        wallet::list_wallet_transactions,
        transfer::prepare_transfer,
        transfer::sign_message,
        transfer::execute_transfer
    ),
    components(
        schemas(
            health::HealthResponse,
            CreateWalletResponse,
            BalanceResponse,
            TransactionRecord,
            TransactionListResponse,
            PrepareTransferRequest,
            PrepareTransferResponse,
            SignMessageRequest,
            SignMessageResponse,
            ExecuteTransferRequest,
            ExecuteTransferResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Wallet", description = "Wallet creation and queries"),
        (name = "Transfer", description = "Signed-message transfer protocol")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger::Ledger, oracle::QuoteClient};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("test.redb")).unwrap();
        let oracle = QuoteClient::new("http://127.0.0.1:9/quote/").unwrap();
        (router(AppState::new(ledger, oracle)), dir)
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (app, _dir) = test_router();
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let (app, _dir) = test_router();
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn end_to_end_transfer_over_http() {
        let (app, _dir) = test_router();

        let (status, alice) = send_json(&app, "POST", "/api/wallet/create", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, bob) = send_json(&app, "POST", "/api/wallet/create", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(alice["balance"], 5.0);

        let (status, prepared) = send_json(
            &app,
            "POST",
            "/api/transfer/prepare",
            json!({
                "from_address": alice["address"],
                "to_address": bob["address"],
                "amount_usd": 100.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(prepared["amount_eth"], 0.05);

        let (status, signed) = send_json(
            &app,
            "POST",
            "/api/transfer/sign",
            json!({
                "address": alice["address"],
                "private_key": alice["private_key"],
                "message": prepared["message"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, executed) = send_json(
            &app,
            "POST",
            "/api/transfer/execute",
            json!({
                "from_address": alice["address"],
                "to_address": bob["address"],
                "amount_eth": prepared["amount_eth"],
                "message": prepared["message"],
                "signature": signed["signature"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(executed["success"], true);
        assert_eq!(executed["new_balance"], 4.95);

        let alice_address = alice["address"].as_str().unwrap();
        let bob_address = bob["address"].as_str().unwrap();

        let (status, balance) =
            get_json(&app, &format!("/api/wallet/{bob_address}/balance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(balance["balance"], 5.05);

        let (status, history) =
            get_json(&app, &format!("/api/wallet/{alice_address}/transactions")).await;
        assert_eq!(status, StatusCode::OK);
        let transactions = history["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["from_address"], *alice_address);
        assert_eq!(transactions[0]["to_address"], *bob_address);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_the_engine() {
        let (app, _dir) = test_router();

        let (status, _) = send_json(
            &app,
            "POST",
            "/api/transfer/prepare",
            json!({ "from_address": "0xabc" }),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn unknown_wallet_is_404_over_http() {
        let (app, _dir) = test_router();
        let (status, body) = get_json(
            &app,
            "/api/wallet/0x0000000000000000000000000000000000000000/balance",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Wallet not found");
    }
}
