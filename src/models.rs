// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! Request bodies are typed structs: a missing or mistyped field is
//! rejected at extraction, before the transfer engine runs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::TransactionRecord;

// =============================================================================
// Wallet Models
// =============================================================================

/// Response after creating a wallet.
///
/// This is the one place the service returns a private key: the simulated
/// client needs it to sign transfer messages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWalletResponse {
    /// EIP-55 checksummed address of the new wallet.
    pub address: String,
    /// Hex-encoded private key (simulation only — never expose in a real
    /// custodial service).
    pub private_key: String,
    /// Starting balance in simulated ETH.
    pub balance: f64,
}

/// Current balance of a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// The queried address.
    pub address: String,
    /// Balance in simulated ETH.
    pub balance: f64,
}

/// Transaction history of a wallet, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionRecord>,
}

// =============================================================================
// Transfer Models
// =============================================================================

/// Request to prepare a transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrepareTransferRequest {
    /// Sender address.
    pub from_address: String,
    /// Recipient address.
    pub to_address: String,
    /// Transfer amount in USD; converted via the price oracle.
    pub amount_usd: f64,
}

/// Prepared transfer: the message to sign plus the quoted amounts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrepareTransferResponse {
    /// Canonical message the sender must sign.
    pub message: String,
    /// Quoted amount in simulated ETH.
    pub amount_eth: f64,
    /// Echo of the requested USD amount.
    pub amount_usd: f64,
}

/// Request to sign a prepared message (simulation only).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignMessageRequest {
    /// Address the signature should be attributed to.
    pub address: String,
    /// Hex-encoded private key. Transmitting a private key is a simulation
    /// convenience; a real client signs locally.
    pub private_key: String,
    /// The message returned by the prepare phase.
    pub message: String,
}

/// Signature over a prepared message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignMessageResponse {
    /// Hex-encoded 65-byte signature.
    pub signature: String,
}

/// Request to execute a signed transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecuteTransferRequest {
    /// Sender address.
    pub from_address: String,
    /// Recipient address.
    pub to_address: String,
    /// Amount in simulated ETH; must match the signed message.
    pub amount_eth: f64,
    /// The exact message text that was signed.
    pub message: String,
    /// Signature authorizing the transfer.
    pub signature: String,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecuteTransferResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Sender balance after the debit.
    pub new_balance: f64,
}
