//! Shared types for the parcel dispatch platform
//!
//! Domain types used by both the dispatch engine and its clients:
//! order/batch/wallet records, status enums, command payloads, command
//! responses, error codes and reference-data models.

pub mod batch;
pub mod command;
pub mod models;
pub mod order;
pub mod util;
pub mod wallet;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use batch::{
    BatchStatus, CascadeOutcome, CascadeResult, MAX_ORDERS_PER_BATCH, ShipmentBatch,
    ShipmentBatchLog,
};
pub use command::{Command, CommandError, CommandPayload, CommandResponse, ErrorCode};
pub use models::{Actor, Area, Customer, Employee, EmployeeRole, Notification, RateCard, Role, Warehouse};
pub use order::{Order, OrderChanges, OrderLog, OrderStatus, Payer, PaymentMethod, PaymentStatus};
pub use wallet::{Wallet, WalletTransaction, WalletTxnType};
