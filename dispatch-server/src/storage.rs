//! redb-based persistence for orders, batches, logs and wallets
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Current order state |
//! | `order_logs` | `(order_id, seq)` | `OrderLog` | History (append-only) |
//! | `batches` | `batch_id` | `ShipmentBatch` | Current batch state |
//! | `batch_logs` | `(batch_id, seq)` | `ShipmentBatchLog` | History (append-only) |
//! | `wallets` | `user_id` | `Wallet` | Running balances |
//! | `wallet_txns` | `(user_id, seq)` | `WalletTransaction` | Ledger (append-only) |
//! | `counters` | name | `u64` | Id and log-sequence counters |
//!
//! Values are JSON-serialized. Log sequences are global monotonic counters;
//! the composite key keeps per-entity entries contiguous and ordered.
//!
//! # Concurrency
//!
//! redb allows exactly one write transaction at a time, so every command's
//! read-validate-write runs as one isolated unit. A command that raced
//! another re-reads the committed state and fails its own validation
//! instead of clobbering the earlier write.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::batch::{ShipmentBatch, ShipmentBatchLog};
use shared::order::{Order, OrderLog};
use shared::wallet::{Wallet, WalletTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");
const ORDER_LOGS_TABLE: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("order_logs");
const BATCHES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("batches");
const BATCH_LOGS_TABLE: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("batch_logs");
const WALLETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");
const WALLET_TXNS_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("wallet_txns");
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_ID_KEY: &str = "order_id";
const BATCH_ID_KEY: &str = "batch_id";
const ORDER_LOG_SEQ_KEY: &str = "order_log_seq";
const BATCH_LOG_SEQ_KEY: &str = "batch_log_seq";
const WALLET_TXN_SEQ_KEY: &str = "wallet_txn_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Dispatch storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl Storage {
    /// Open or create the database at the given path.
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns
    /// the transaction survives power loss, and the file is always left in
    /// a consistent state (copy-on-write with atomic pointer swap).
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables up front so later reads never hit a missing table
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(ORDER_LOGS_TABLE)?;
            let _ = txn.open_table(BATCHES_TABLE)?;
            let _ = txn.open_table(BATCH_LOGS_TABLE)?;
            let _ = txn.open_table(WALLETS_TABLE)?;
            let _ = txn.open_table(WALLET_TXNS_TABLE)?;
            let _ = txn.open_table(COUNTERS_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Begin the (single) write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Counters ==========

    fn next_counter(&self, txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Allocate the next order id (within the command transaction)
    pub fn next_order_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_counter(txn, ORDER_ID_KEY)
    }

    /// Allocate the next batch id (within the command transaction)
    pub fn next_batch_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_counter(txn, BATCH_ID_KEY)
    }

    // ========== Orders ==========

    /// Read an order inside a write transaction (sees pending writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Read an order (read-only snapshot)
    pub fn get_order(&self, order_id: u64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id, bytes.as_slice())?;
        Ok(())
    }

    /// Hard delete (administrative override path only)
    pub fn remove_order(&self, txn: &WriteTransaction, order_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// All orders (reference-scale dataset; used by queries and tests)
    pub fn all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Find an order by its human-facing tracking code
    pub fn find_order_by_tracking_code(&self, code: &str) -> StorageResult<Option<Order>> {
        Ok(self
            .all_orders()?
            .into_iter()
            .find(|o| o.tracking_code == code))
    }

    /// Current members of a batch, inside the write transaction
    pub fn orders_in_batch_txn(
        &self,
        txn: &WriteTransaction,
        batch_id: u64,
    ) -> StorageResult<Vec<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let mut orders: Vec<Order> = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.shipment_batch_id == Some(batch_id) {
                orders.push(order);
            }
        }
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    /// Current members of a batch (read-only snapshot)
    pub fn orders_in_batch(&self, batch_id: u64) -> StorageResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .all_orders()?
            .into_iter()
            .filter(|o| o.shipment_batch_id == Some(batch_id))
            .collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    // ========== Order logs ==========

    pub fn append_order_log(&self, txn: &WriteTransaction, log: &OrderLog) -> StorageResult<()> {
        let seq = self.next_counter(txn, ORDER_LOG_SEQ_KEY)?;
        let mut table = txn.open_table(ORDER_LOGS_TABLE)?;
        let bytes = serde_json::to_vec(log)?;
        table.insert((log.order_id, seq), bytes.as_slice())?;
        Ok(())
    }

    /// Full history for an order, oldest first
    pub fn order_logs(&self, order_id: u64) -> StorageResult<Vec<OrderLog>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_LOGS_TABLE)?;
        let mut logs = Vec::new();
        for entry in table.range((order_id, 0)..=(order_id, u64::MAX))? {
            let (_, value) = entry?;
            logs.push(serde_json::from_slice(value.value())?);
        }
        Ok(logs)
    }

    /// Remove an order's history (administrative delete only)
    pub fn remove_order_logs(&self, txn: &WriteTransaction, order_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_LOGS_TABLE)?;
        table.retain_in((order_id, 0)..=(order_id, u64::MAX), |_, _| false)?;
        Ok(())
    }

    // ========== Batches ==========

    pub fn get_batch_txn(
        &self,
        txn: &WriteTransaction,
        batch_id: u64,
    ) -> StorageResult<Option<ShipmentBatch>> {
        let table = txn.open_table(BATCHES_TABLE)?;
        match table.get(batch_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_batch(&self, batch_id: u64) -> StorageResult<Option<ShipmentBatch>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BATCHES_TABLE)?;
        match table.get(batch_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn store_batch(&self, txn: &WriteTransaction, batch: &ShipmentBatch) -> StorageResult<()> {
        let mut table = txn.open_table(BATCHES_TABLE)?;
        let bytes = serde_json::to_vec(batch)?;
        table.insert(batch.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn remove_batch(&self, txn: &WriteTransaction, batch_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(BATCHES_TABLE)?;
        table.remove(batch_id)?;
        Ok(())
    }

    pub fn append_batch_log(
        &self,
        txn: &WriteTransaction,
        log: &ShipmentBatchLog,
    ) -> StorageResult<()> {
        let seq = self.next_counter(txn, BATCH_LOG_SEQ_KEY)?;
        let mut table = txn.open_table(BATCH_LOGS_TABLE)?;
        let bytes = serde_json::to_vec(log)?;
        table.insert((log.batch_id, seq), bytes.as_slice())?;
        Ok(())
    }

    /// Full history for a batch, oldest first
    pub fn batch_logs(&self, batch_id: u64) -> StorageResult<Vec<ShipmentBatchLog>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BATCH_LOGS_TABLE)?;
        let mut logs = Vec::new();
        for entry in table.range((batch_id, 0)..=(batch_id, u64::MAX))? {
            let (_, value) = entry?;
            logs.push(serde_json::from_slice(value.value())?);
        }
        Ok(logs)
    }

    pub fn remove_batch_logs(&self, txn: &WriteTransaction, batch_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(BATCH_LOGS_TABLE)?;
        table.retain_in((batch_id, 0)..=(batch_id, u64::MAX), |_, _| false)?;
        Ok(())
    }

    // ========== Wallets ==========

    pub fn get_wallet_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<Wallet>> {
        let table = txn.open_table(WALLETS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_wallet(&self, user_id: &str) -> StorageResult<Option<Wallet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn store_wallet(&self, txn: &WriteTransaction, wallet: &Wallet) -> StorageResult<()> {
        let mut table = txn.open_table(WALLETS_TABLE)?;
        let bytes = serde_json::to_vec(wallet)?;
        table.insert(wallet.user_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    pub fn append_wallet_txn(
        &self,
        txn: &WriteTransaction,
        record: &WalletTransaction,
    ) -> StorageResult<()> {
        let seq = self.next_counter(txn, WALLET_TXN_SEQ_KEY)?;
        let mut table = txn.open_table(WALLET_TXNS_TABLE)?;
        let bytes = serde_json::to_vec(record)?;
        table.insert((record.wallet_user_id.as_str(), seq), bytes.as_slice())?;
        Ok(())
    }

    /// Ledger entries for a user, newest first
    pub fn wallet_transactions(&self, user_id: &str) -> StorageResult<Vec<WalletTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_TXNS_TABLE)?;
        let mut txns = Vec::new();
        for entry in table.range((user_id, 0)..=(user_id, u64::MAX))? {
            let (_, value) = entry?;
            txns.push(serde_json::from_slice(value.value())?);
        }
        txns.reverse();
        Ok(txns)
    }
}
