//! Wallet ledger postings
//!
//! A wallet is created lazily on its first posting. The balance update
//! and the ledger append happen in the caller's transaction, so the
//! balance is always the sum of the ledger.

use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::wallet::{Wallet, WalletTransaction, WalletTxnType};

use crate::storage::{Storage, StorageResult};

/// Apply a signed amount to a user's wallet and append the ledger entry
#[allow(clippy::too_many_arguments)]
pub fn post(
    storage: &Storage,
    txn: &WriteTransaction,
    user_id: &str,
    amount: Decimal,
    txn_type: WalletTxnType,
    description: impl Into<String>,
    related_order_id: Option<u64>,
    now: i64,
) -> StorageResult<Wallet> {
    let mut wallet = storage
        .get_wallet_txn(txn, user_id)?
        .unwrap_or_else(|| Wallet {
            user_id: user_id.to_string(),
            balance: Decimal::ZERO,
            last_updated: now,
        });
    wallet.balance += amount;
    wallet.last_updated = now;
    storage.store_wallet(txn, &wallet)?;

    storage.append_wallet_txn(
        txn,
        &WalletTransaction {
            wallet_user_id: user_id.to_string(),
            amount,
            txn_type,
            description: description.into(),
            related_order_id,
            created_at: now,
        },
    )?;
    Ok(wallet)
}
