// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    engine::TransferError,
    ledger::LedgerError,
    signing::SigningError,
};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Boundary mapping for the transfer protocol taxonomy: unknown wallets are
/// 404, persistence failures and malformed keys on the sign path are 500,
/// every authentication/consistency/validation failure is 400.
impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let status = match &err {
            TransferError::SenderNotFound
            | TransferError::RecipientNotFound
            | TransferError::WalletNotFound => StatusCode::NOT_FOUND,
            TransferError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TransferError::Signing(SigningError::InvalidKey(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WalletNotFound(_) => ApiError::not_found("Wallet not found"),
            LedgerError::DuplicateWallet(_) => ApiError::bad_request("Wallet already exists"),
            LedgerError::InsufficientBalance => ApiError::bad_request("Insufficient balance"),
            other => ApiError::internal(format!("Ledger failure: {other}")),
        }
    }
}
