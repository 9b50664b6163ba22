// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key generation and message signing for simulated wallets.
//!
//! Keys are secp256k1 (Ethereum-compatible); wallet addresses are derived
//! from the public key and rendered EIP-55 checksummed. Message signing
//! uses the EIP-191 `personal_sign` scheme, so signatures produced here are
//! domain-separated from transaction signatures and other contexts.

use alloy::{
    primitives::{Address, Signature},
    signers::{local::PrivateKeySigner, SignerSync},
};

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

/// A freshly generated wallet key pair.
///
/// The private key is hex-encoded with a `0x` prefix. It is handed to the
/// client once at wallet creation; this service also retains it because it
/// is a custodial simulation.
#[derive(Debug, Clone)]
pub struct Keypair {
    /// EIP-55 checksummed address derived from the public key.
    pub address: String,
    /// Hex-encoded private key (0x + 64 characters).
    pub private_key: String,
}

/// Generate a cryptographically random secp256k1 key pair.
pub fn generate_keypair() -> Keypair {
    let signer = PrivateKeySigner::random();
    Keypair {
        address: signer.address().to_string(),
        private_key: format!("0x{}", alloy::hex::encode(signer.to_bytes())),
    }
}

/// Parse a hex-encoded private key (with or without `0x` prefix) into a signer.
pub fn signer_from_hex(private_key: &str) -> Result<PrivateKeySigner, SigningError> {
    let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
    key_hex
        .parse()
        .map_err(|e| SigningError::InvalidKey(format!("{e}")))
}

/// Derive the address controlled by a hex-encoded private key.
pub fn address_of(private_key: &str) -> Result<Address, SigningError> {
    Ok(signer_from_hex(private_key)?.address())
}

/// Sign `message` with an already-parsed signer under EIP-191.
///
/// Returns the 65-byte signature (r || s || v) hex-encoded with `0x` prefix.
pub fn sign_with(signer: &PrivateKeySigner, message: &str) -> Result<String, SigningError> {
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    Ok(format!("0x{}", alloy::hex::encode(signature.as_bytes())))
}

/// Sign `message` with a hex-encoded private key under EIP-191.
pub fn sign_text(private_key: &str, message: &str) -> Result<String, SigningError> {
    let signer = signer_from_hex(private_key)?;
    sign_with(&signer, message)
}

/// Recover the address that signed `message`.
///
/// Applies the same EIP-191 canonicalization as [`sign_text`], so a
/// signature round-trips to its signer's address. Fails with
/// [`SigningError::InvalidSignature`] on malformed hex, wrong length, or a
/// recovery id outside the valid range.
pub fn recover_signer(message: &str, signature: &str) -> Result<Address, SigningError> {
    let sig_hex = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = alloy::hex::decode(sig_hex)
        .map_err(|e| SigningError::InvalidSignature(format!("invalid hex: {e}")))?;

    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| SigningError::InvalidSignature(format!("recovery failed: {e}")))
}
