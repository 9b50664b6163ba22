// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer protocol engine.
//!
//! Orchestrates the three phases of a signed-message transfer:
//!
//! 1. **Prepare** — validate both wallets, quote USD → ETH, pre-check the
//!    sender balance, and build the canonical message for the client to
//!    sign. Nothing is persisted.
//! 2. **Sign** — simulation-only convenience: verify the submitted private
//!    key derives the claimed address and produce an EIP-191 signature. In
//!    a real deployment the client signs locally and never transmits its
//!    key.
//! 3. **Execute** — authenticate the signature, re-extract the transfer
//!    terms from the literal message text, cross-check them against the
//!    request, and commit the balance movement atomically.
//!
//! Each phase is stateless; everything is re-validated from data the client
//! resubmits.

use std::sync::Arc;

use crate::{
    config::AMOUNT_TOLERANCE_ETH,
    ledger::{CommittedTransfer, Ledger, LedgerError},
    message,
    oracle::QuoteClient,
    signing::{self, SigningError},
};

/// Failure modes of the transfer protocol, mapped to HTTP statuses at the
/// service boundary. Display strings double as client-facing error messages.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Sender wallet not found")]
    SenderNotFound,

    #[error("Recipient wallet not found")]
    RecipientNotFound,

    #[error("Wallet not found")]
    WalletNotFound,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Invalid private key for this address")]
    KeyMismatch,

    #[error("Invalid signature")]
    SignerMismatch,

    #[error("Invalid message format")]
    MalformedMessage,

    #[error("Amount does not match signed message")]
    AmountMismatch,

    #[error("Recipient address does not match signed message")]
    RecipientMismatch,

    #[error("Sender address does not match signed message")]
    SenderMismatch,

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("ledger failure: {0}")]
    Ledger(LedgerError),
}

impl From<LedgerError> for TransferError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance => TransferError::InsufficientBalance,
            LedgerError::WalletNotFound(_) => TransferError::WalletNotFound,
            other => TransferError::Ledger(other),
        }
    }
}

/// Output of the prepare phase.
#[derive(Debug, Clone)]
pub struct PreparedTransfer {
    /// Canonical message the sender must sign.
    pub message: String,
    /// Quoted amount in simulated ETH.
    pub amount_eth: f64,
    /// The USD amount that was quoted.
    pub amount_usd: f64,
}

/// Output of the execute phase.
#[derive(Debug, Clone)]
pub struct ExecutedTransfer {
    /// Sender balance after the debit.
    pub new_balance: f64,
    /// Id of the appended transaction record.
    pub tx_id: u64,
}

/// The transfer protocol engine. Cheap to clone; shares the ledger handle.
#[derive(Clone)]
pub struct TransferEngine {
    ledger: Arc<Ledger>,
    oracle: QuoteClient,
}

impl TransferEngine {
    pub fn new(ledger: Arc<Ledger>, oracle: QuoteClient) -> Self {
        Self { ledger, oracle }
    }

    /// Prepare phase: quote the USD amount and build the canonical message.
    ///
    /// The balance check here is a convenience pre-check for the client;
    /// the authoritative check happens inside the execute commit.
    pub async fn prepare(
        &self,
        from_address: &str,
        to_address: &str,
        amount_usd: f64,
    ) -> Result<PreparedTransfer, TransferError> {
        if amount_usd <= 0.0 {
            return Err(TransferError::NonPositiveAmount);
        }

        let sender = self
            .ledger
            .get_wallet(from_address)
            .map_err(|e| not_found_as(e, TransferError::SenderNotFound))?;
        self.ledger
            .get_wallet(to_address)
            .map_err(|e| not_found_as(e, TransferError::RecipientNotFound))?;

        // The oracle call holds no ledger lock and never fails; it degrades
        // to the fallback rate.
        let amount_eth = self.oracle.quote_usd_to_eth(amount_usd, from_address).await;

        if sender.balance < amount_eth {
            return Err(TransferError::InsufficientBalance);
        }

        let message = message::render(amount_eth, amount_usd, to_address, from_address);

        Ok(PreparedTransfer {
            message,
            amount_eth,
            amount_usd,
        })
    }

    /// Sign phase (simulation-only).
    ///
    /// Accepts a raw private key over the wire, which exists purely so the
    /// demo client can exercise the protocol without a local signer. Fails
    /// with [`TransferError::KeyMismatch`] if the key does not derive
    /// `address`.
    pub fn sign(
        &self,
        address: &str,
        private_key: &str,
        message: &str,
    ) -> Result<String, TransferError> {
        let signer = signing::signer_from_hex(private_key)?;
        if !signer.address().to_string().eq_ignore_ascii_case(address) {
            return Err(TransferError::KeyMismatch);
        }
        Ok(signing::sign_with(&signer, message)?)
    }

    /// Execute phase: authenticate, cross-check, and commit.
    ///
    /// Preconditions run in order; any failure aborts with no mutation:
    /// both wallets exist, the recovered signer is the sender, the message
    /// parses under the canonical grammar, and the parsed amount, recipient,
    /// and sender all match the request. The final balance check and the
    /// three-way mutation (debit, credit, append) are one atomic ledger
    /// commit.
    pub fn execute(
        &self,
        from_address: &str,
        to_address: &str,
        amount_eth: f64,
        message: &str,
        signature: &str,
    ) -> Result<ExecutedTransfer, TransferError> {
        if amount_eth <= 0.0 {
            return Err(TransferError::NonPositiveAmount);
        }

        self.ledger
            .get_wallet(from_address)
            .map_err(|e| not_found_as(e, TransferError::WalletNotFound))?;
        self.ledger
            .get_wallet(to_address)
            .map_err(|e| not_found_as(e, TransferError::WalletNotFound))?;

        let recovered = signing::recover_signer(message, signature)?;
        if !recovered.to_string().eq_ignore_ascii_case(from_address) {
            return Err(TransferError::SignerMismatch);
        }

        let terms = message::parse(message).ok_or(TransferError::MalformedMessage)?;

        if (terms.amount_eth - amount_eth).abs() > AMOUNT_TOLERANCE_ETH {
            return Err(TransferError::AmountMismatch);
        }
        if !terms.to_address.eq_ignore_ascii_case(to_address) {
            return Err(TransferError::RecipientMismatch);
        }
        if !terms.from_address.eq_ignore_ascii_case(from_address) {
            return Err(TransferError::SenderMismatch);
        }

        let CommittedTransfer {
            record,
            new_sender_balance,
        } = self
            .ledger
            .commit_transfer(from_address, to_address, amount_eth, signature)?;

        tracing::info!(
            tx_id = record.id,
            from = %record.from_address,
            to = %record.to_address,
            amount_eth,
            new_sender_balance,
            "Transfer committed"
        );

        Ok(ExecutedTransfer {
            new_balance: new_sender_balance,
            tx_id: record.id,
        })
    }
}

fn not_found_as(err: LedgerError, replacement: TransferError) -> TransferError {
    match err {
        LedgerError::WalletNotFound(_) => replacement,
        other => other.into(),
    }
}
