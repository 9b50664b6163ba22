// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallets`: lowercase address → serialized WalletRecord
//! - `transactions`: tx id → serialized TransactionRecord
//! - `wallet_tx_index`: composite key (address|!id_be) → tx id
//! - `ledger_meta`: key → counter (next transaction id)
//!
//! Wallet rows are keyed by lowercase address so lookups are
//! case-insensitive; each record retains the checksummed display address.
//! The transfer commit (debit, credit, append) runs inside a single write
//! transaction, and redb serializes writers, so two concurrent transfers
//! never interleave a partial debit/credit.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::STARTING_BALANCE_ETH;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary wallet table: lowercase address → WalletRecord (JSON bytes).
const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

/// Append-only transaction log: id → TransactionRecord (JSON bytes).
const TRANSACTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("transactions");

/// Index: composite key → tx id.
/// Key format: `address|!id_be` for newest-first range scans.
const WALLET_TX_INDEX: TableDefinition<&[u8], u64> = TableDefinition::new("wallet_tx_index");

/// Ledger state: key → counter (e.g. "next_tx_id").
const LEDGER_META: TableDefinition<&str, u64> = TableDefinition::new("ledger_meta");

const NEXT_TX_ID_KEY: &str = "next_tx_id";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("wallet already exists: {0}")]
    DuplicateWallet(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    #[error("insufficient balance")]
    InsufficientBalance,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Records
// =============================================================================

/// A custodial wallet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Checksummed display address.
    pub address: String,
    /// Hex-encoded private key. Custodial simulation only.
    pub private_key: String,
    /// Current balance in simulated ETH. Never negative.
    pub balance: f64,
}

/// An immutable entry in the transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    /// Monotonically increasing identifier.
    pub id: u64,
    /// Sender address.
    pub from_address: String,
    /// Recipient address.
    pub to_address: String,
    /// Transferred amount in simulated ETH.
    pub amount: f64,
    /// The signature that authorized this transfer.
    pub signature: String,
    /// Commit time.
    pub timestamp: DateTime<Utc>,
}

/// Result of a committed transfer.
#[derive(Debug, Clone)]
pub struct CommittedTransfer {
    /// The appended log entry.
    pub record: TransactionRecord,
    /// Sender balance after the debit.
    pub new_sender_balance: f64,
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the wallet_tx_index table.
///
/// Format: `lowercase_address | inverted_id_be_bytes`
///
/// The inverted id ensures newest-first ordering when scanning forward.
fn make_index_key(address: &str, id: u64) -> Vec<u8> {
    let addr = address.to_lowercase();
    let mut key = Vec::with_capacity(addr.len() + 1 + 8);
    key.extend_from_slice(addr.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!id).to_be_bytes());
    key
}

/// Build a prefix key for range scanning all transactions of an address.
fn make_prefix(address: &str) -> Vec<u8> {
    let addr = address.to_lowercase();
    let mut prefix = Vec::with_capacity(addr.len() + 1);
    prefix.extend_from_slice(addr.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(address: &str) -> Vec<u8> {
    let mut end = make_prefix(address);
    end.extend_from_slice(&[0xFF; 9]);
    end
}

// =============================================================================
// Ledger
// =============================================================================

/// Embedded ACID ledger holding wallets and the transaction log.
pub struct Ledger {
    db: Database,
}

impl Ledger {
    /// Open (or create) the ledger at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(TRANSACTIONS)?;
            let _ = write_txn.open_table(WALLET_TX_INDEX)?;
            let _ = write_txn.open_table(LEDGER_META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Wallets
    // =========================================================================

    /// Insert a new wallet with the fixed starting balance.
    pub fn create_wallet(&self, address: &str, private_key: &str) -> LedgerResult<WalletRecord> {
        let key = address.to_lowercase();
        let record = WalletRecord {
            address: address.to_string(),
            private_key: private_key.to_string(),
            balance: STARTING_BALANCE_ETH,
        };
        let json = serde_json::to_vec(&record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut wallets = write_txn.open_table(WALLETS)?;
            if wallets.get(key.as_str())?.is_some() {
                return Err(LedgerError::DuplicateWallet(address.to_string()));
            }
            wallets.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(record)
    }

    /// Look up a wallet by address (case-insensitive).
    pub fn get_wallet(&self, address: &str) -> LedgerResult<WalletRecord> {
        let key = address.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let wallets = read_txn.open_table(WALLETS)?;
        match wallets.get(key.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(LedgerError::WalletNotFound(address.to_string())),
        }
    }

    /// Unconditionally overwrite a wallet's balance.
    ///
    /// The caller is responsible for invariant enforcement; transfers never
    /// use this — they go through [`Ledger::commit_transfer`].
    pub fn set_balance(&self, address: &str, new_balance: f64) -> LedgerResult<()> {
        let key = address.to_lowercase();
        let write_txn = self.db.begin_write()?;
        {
            let mut wallets = write_txn.open_table(WALLETS)?;
            let mut record: WalletRecord = match wallets.get(key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(LedgerError::WalletNotFound(address.to_string())),
            };
            record.balance = new_balance;
            let json = serde_json::to_vec(&record)?;
            wallets.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Atomically debit the sender, credit the recipient, and append a
    /// transaction record.
    ///
    /// The sender balance is re-read inside the write transaction — this is
    /// the authoritative overdraft check. If it fails, or any step fails,
    /// the transaction aborts with no mutation.
    pub fn commit_transfer(
        &self,
        from_address: &str,
        to_address: &str,
        amount: f64,
        signature: &str,
    ) -> LedgerResult<CommittedTransfer> {
        let from_key = from_address.to_lowercase();
        let to_key = to_address.to_lowercase();

        let write_txn = self.db.begin_write()?;
        let committed = {
            let mut wallets = write_txn.open_table(WALLETS)?;

            let mut sender: WalletRecord = match wallets.get(from_key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(LedgerError::WalletNotFound(from_address.to_string())),
            };
            let mut recipient: WalletRecord = match wallets.get(to_key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(LedgerError::WalletNotFound(to_address.to_string())),
            };

            if sender.balance < amount {
                return Err(LedgerError::InsufficientBalance);
            }

            if from_key == to_key {
                // Self-transfer: debit and credit cancel out.
                let json = serde_json::to_vec(&sender)?;
                wallets.insert(from_key.as_str(), json.as_slice())?;
            } else {
                sender.balance -= amount;
                recipient.balance += amount;
                let sender_json = serde_json::to_vec(&sender)?;
                let recipient_json = serde_json::to_vec(&recipient)?;
                wallets.insert(from_key.as_str(), sender_json.as_slice())?;
                wallets.insert(to_key.as_str(), recipient_json.as_slice())?;
            }

            let mut meta = write_txn.open_table(LEDGER_META)?;
            let id = match meta.get(NEXT_TX_ID_KEY)? {
                Some(value) => value.value(),
                None => 1,
            };
            meta.insert(NEXT_TX_ID_KEY, id + 1)?;

            let record = TransactionRecord {
                id,
                from_address: sender.address.clone(),
                to_address: recipient.address.clone(),
                amount,
                signature: signature.to_string(),
                timestamp: Utc::now(),
            };
            let record_json = serde_json::to_vec(&record)?;

            let mut transactions = write_txn.open_table(TRANSACTIONS)?;
            transactions.insert(id, record_json.as_slice())?;

            let mut index = write_txn.open_table(WALLET_TX_INDEX)?;
            index.insert(make_index_key(&from_key, id).as_slice(), id)?;
            index.insert(make_index_key(&to_key, id).as_slice(), id)?;

            CommittedTransfer {
                record,
                new_sender_balance: sender.balance,
            }
        };
        write_txn.commit()?;
        Ok(committed)
    }

    /// List all transactions where the address is sender or recipient,
    /// newest first.
    pub fn list_transactions(&self, address: &str) -> LedgerResult<Vec<TransactionRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(WALLET_TX_INDEX)?;
        let transactions = read_txn.open_table(TRANSACTIONS)?;

        let prefix = make_prefix(address);
        let prefix_end = make_prefix_end(address);

        let mut records = Vec::new();
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let id = entry.1.value();
            if let Some(value) = transactions.get(id)? {
                records.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(records)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger() -> (Ledger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("test.redb")).unwrap();
        (ledger, dir)
    }

    const ALICE: &str = "0xAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAa";
    const BOB: &str = "0xBbBbBbBbBbBbBbBbBbBbBbBbBbBbBbBbBbBbBbBb";

    #[test]
    fn create_and_get_wallet() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xkey").unwrap();

        let wallet = ledger.get_wallet(ALICE).unwrap();
        assert_eq!(wallet.address, ALICE);
        assert_eq!(wallet.private_key, "0xkey");
        assert_eq!(wallet.balance, STARTING_BALANCE_ETH);
    }

    #[test]
    fn get_wallet_is_case_insensitive() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xkey").unwrap();

        let wallet = ledger.get_wallet(&ALICE.to_lowercase()).unwrap();
        assert_eq!(wallet.address, ALICE);
    }

    #[test]
    fn create_duplicate_fails() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xkey").unwrap();

        let result = ledger.create_wallet(&ALICE.to_lowercase(), "0xother");
        assert!(matches!(result, Err(LedgerError::DuplicateWallet(_))));
    }

    #[test]
    fn get_missing_wallet_errors() {
        let (ledger, _dir) = temp_ledger();
        assert!(matches!(
            ledger.get_wallet(BOB),
            Err(LedgerError::WalletNotFound(_))
        ));
    }

    #[test]
    fn set_balance_overwrites() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xkey").unwrap();

        ledger.set_balance(ALICE, 42.5).unwrap();
        assert_eq!(ledger.get_wallet(ALICE).unwrap().balance, 42.5);
    }

    #[test]
    fn commit_transfer_moves_balance_and_appends_record() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        let committed = ledger.commit_transfer(ALICE, BOB, 1.25, "0xsig").unwrap();
        assert_eq!(committed.new_sender_balance, 3.75);
        assert_eq!(committed.record.id, 1);
        assert_eq!(committed.record.from_address, ALICE);
        assert_eq!(committed.record.to_address, BOB);
        assert_eq!(committed.record.amount, 1.25);

        assert_eq!(ledger.get_wallet(ALICE).unwrap().balance, 3.75);
        assert_eq!(ledger.get_wallet(BOB).unwrap().balance, 6.25);
    }

    #[test]
    fn commit_transfer_conserves_total_supply() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        ledger.commit_transfer(ALICE, BOB, 2.0, "0xsig").unwrap();

        let total =
            ledger.get_wallet(ALICE).unwrap().balance + ledger.get_wallet(BOB).unwrap().balance;
        assert_eq!(total, 2.0 * STARTING_BALANCE_ETH);
    }

    #[test]
    fn overdraft_aborts_without_mutation() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        let result = ledger.commit_transfer(ALICE, BOB, 100.0, "0xsig");
        assert!(matches!(result, Err(LedgerError::InsufficientBalance)));

        assert_eq!(ledger.get_wallet(ALICE).unwrap().balance, STARTING_BALANCE_ETH);
        assert_eq!(ledger.get_wallet(BOB).unwrap().balance, STARTING_BALANCE_ETH);
        assert!(ledger.list_transactions(ALICE).unwrap().is_empty());
    }

    #[test]
    fn self_transfer_nets_to_zero() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();

        let committed = ledger.commit_transfer(ALICE, ALICE, 1.0, "0xsig").unwrap();
        assert_eq!(committed.new_sender_balance, STARTING_BALANCE_ETH);
        assert_eq!(ledger.get_wallet(ALICE).unwrap().balance, STARTING_BALANCE_ETH);
        assert_eq!(ledger.list_transactions(ALICE).unwrap().len(), 1);
    }

    #[test]
    fn list_transactions_newest_first_both_directions() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        ledger.commit_transfer(ALICE, BOB, 1.0, "0xsig1").unwrap();
        ledger.commit_transfer(BOB, ALICE, 0.5, "0xsig2").unwrap();
        ledger.commit_transfer(ALICE, BOB, 0.25, "0xsig3").unwrap();

        let records = ledger.list_transactions(ALICE).unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        // Bob sees the same log — he is party to every transfer.
        let bob_records = ledger.list_transactions(BOB).unwrap();
        assert_eq!(bob_records.len(), 3);
    }

    #[test]
    fn transaction_ids_are_monotonic() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        for i in 0..4 {
            let committed = ledger
                .commit_transfer(ALICE, BOB, 0.1, &format!("0xsig{i}"))
                .unwrap();
            assert_eq!(committed.record.id, i + 1);
        }
    }

    #[test]
    fn concurrent_transfers_never_overdraw() {
        let (ledger, _dir) = temp_ledger();
        ledger.create_wallet(ALICE, "0xa").unwrap();
        ledger.create_wallet(BOB, "0xb").unwrap();

        // Two 3.0 ETH transfers against a 5.0 balance: at most one can win.
        let ledger = std::sync::Arc::new(ledger);
        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                ledger.commit_transfer(ALICE, BOB, 3.0, "0xsig")
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LedgerError::InsufficientBalance))));

        assert_eq!(ledger.get_wallet(ALICE).unwrap().balance, 2.0);
        assert_eq!(ledger.get_wallet(BOB).unwrap().balance, 8.0);
    }

    #[test]
    fn make_index_key_ordering() {
        // Newer ids should produce smaller composite keys (descending)
        let key_old = make_index_key("0xaddr", 1);
        let key_new = make_index_key("0xaddr", 2);
        assert!(key_new < key_old, "Newer ids should sort first");
    }
}
