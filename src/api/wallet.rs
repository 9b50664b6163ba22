// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet management API endpoints: creation, balance, transaction history.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{BalanceResponse, CreateWalletResponse, TransactionListResponse},
    signing,
    state::AppState,
};

/// Create a new wallet with the fixed starting balance.
///
/// Generates a random secp256k1 keypair and stores it in the ledger. The
/// private key is returned to the caller so the demo client can sign
/// transfer messages — a simulation convenience, not a real-world pattern.
#[utoipa::path(
    post,
    path = "/api/wallet/create",
    tag = "Wallet",
    responses(
        (status = 200, description = "Wallet created successfully", body = CreateWalletResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_wallet(
    State(state): State<AppState>,
) -> Result<Json<CreateWalletResponse>, ApiError> {
    let keypair = signing::generate_keypair();

    let record = state
        .ledger
        .create_wallet(&keypair.address, &keypair.private_key)?;

    tracing::info!(address = %record.address, "Wallet created");

    Ok(Json(CreateWalletResponse {
        address: record.address,
        private_key: record.private_key,
        balance: record.balance,
    }))
}

/// Get the current balance of a wallet.
#[utoipa::path(
    get,
    path = "/api/wallet/{address}/balance",
    tag = "Wallet",
    params(
        ("address" = String, Path, description = "Wallet address")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 404, description = "Wallet not found")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let wallet = state
        .ledger
        .get_wallet(&address)
        .map_err(|_| ApiError::not_found("Wallet not found"))?;

    Ok(Json(BalanceResponse {
        address,
        balance: wallet.balance,
    }))
}

/// List a wallet's transactions, newest first.
#[utoipa::path(
    get,
    path = "/api/wallet/{address}/transactions",
    tag = "Wallet",
    params(
        ("address" = String, Path, description = "Wallet address")
    ),
    responses(
        (status = 200, description = "Transaction history", body = TransactionListResponse),
        (status = 404, description = "Wallet not found")
    )
)]
pub async fn list_wallet_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    state
        .ledger
        .get_wallet(&address)
        .map_err(|_| ApiError::not_found("Wallet not found"))?;

    let transactions = state.ledger.list_transactions(&address)?;

    Ok(Json(TransactionListResponse { transactions }))
}
