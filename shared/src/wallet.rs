//! Wallet ledger types
//!
//! Every user (customer or employee) owns at most one wallet, created
//! lazily on its first posting. The balance is always the sum of the
//! wallet's transactions; both are written together atomically by the
//! engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub user_id: String,
    /// Signed running total
    pub balance: Decimal,
    pub last_updated: i64,
}

/// Ledger entry category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletTxnType {
    /// Automatic refund to the customer when a paid order is returned
    Refund,
    /// Cash the shipper collected and now owes the company
    CodDeduct,
    Deposit,
}

impl std::fmt::Display for WalletTxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WalletTxnType::Refund => "REFUND",
            WalletTxnType::CodDeduct => "COD_DEDUCT",
            WalletTxnType::Deposit => "DEPOSIT",
        };
        write!(f, "{s}")
    }
}

/// Immutable ledger entry; append-only, never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletTransaction {
    pub wallet_user_id: String,
    /// Signed amount (negative for deductions)
    pub amount: Decimal,
    pub txn_type: WalletTxnType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_order_id: Option<u64>,
    pub created_at: i64,
}
