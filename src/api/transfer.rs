// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer protocol endpoints: prepare, sign, execute.
//!
//! The sign endpoint is simulation-only — it accepts a raw private key so
//! the demo UI can exercise the protocol without a local signer. A real
//! deployment would drop it and have clients sign locally.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{
        ExecuteTransferRequest, ExecuteTransferResponse, PrepareTransferRequest,
        PrepareTransferResponse, SignMessageRequest, SignMessageResponse,
    },
    state::AppState,
};

/// Prepare a transfer: quote USD → ETH and build the message to sign.
#[utoipa::path(
    post,
    path = "/api/transfer/prepare",
    tag = "Transfer",
    request_body = PrepareTransferRequest,
    responses(
        (status = 200, description = "Transfer prepared", body = PrepareTransferResponse),
        (status = 400, description = "Invalid amount or insufficient balance"),
        (status = 404, description = "Sender or recipient wallet not found")
    )
)]
pub async fn prepare_transfer(
    State(state): State<AppState>,
    Json(request): Json<PrepareTransferRequest>,
) -> Result<Json<PrepareTransferResponse>, ApiError> {
    let prepared = state
        .engine
        .prepare(&request.from_address, &request.to_address, request.amount_usd)
        .await?;

    Ok(Json(PrepareTransferResponse {
        message: prepared.message,
        amount_eth: prepared.amount_eth,
        amount_usd: prepared.amount_usd,
    }))
}

/// Sign a prepared message on behalf of a wallet (simulation only).
#[utoipa::path(
    post,
    path = "/api/transfer/sign",
    tag = "Transfer",
    request_body = SignMessageRequest,
    responses(
        (status = 200, description = "Message signed", body = SignMessageResponse),
        (status = 400, description = "Private key does not derive the address"),
        (status = 500, description = "Malformed private key")
    )
)]
pub async fn sign_message(
    State(state): State<AppState>,
    Json(request): Json<SignMessageRequest>,
) -> Result<Json<SignMessageResponse>, ApiError> {
    let signature = state
        .engine
        .sign(&request.address, &request.private_key, &request.message)?;

    Ok(Json(SignMessageResponse { signature }))
}

/// Execute a signed transfer.
///
/// Authenticates the signature, cross-checks the request against the
/// signed message text, and commits the balance movement atomically.
#[utoipa::path(
    post,
    path = "/api/transfer/execute",
    tag = "Transfer",
    request_body = ExecuteTransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = ExecuteTransferResponse),
        (status = 400, description = "Authentication, consistency, or balance failure"),
        (status = 404, description = "Wallet not found")
    )
)]
pub async fn execute_transfer(
    State(state): State<AppState>,
    Json(request): Json<ExecuteTransferRequest>,
) -> Result<Json<ExecuteTransferResponse>, ApiError> {
    let executed = state.engine.execute(
        &request.from_address,
        &request.to_address,
        request.amount_eth,
        &request.message,
        &request.signature,
    )?;

    Ok(Json(ExecuteTransferResponse {
        success: true,
        message: "Transfer successful".to_string(),
        new_balance: executed.new_balance,
    }))
}
