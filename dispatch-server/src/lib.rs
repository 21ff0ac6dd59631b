//! Parcel dispatch engine
//!
//! Implements the order lifecycle and shipment-batch state machines for a
//! parcel-delivery backend, with their financial and notification side
//! effects:
//!
//! - **orders**: per-order state machine (pickup, inter-area transport,
//!   delivery, return) driven by role-scoped command actions
//! - **batches**: consolidated linehaul batches whose transitions cascade
//!   to every member order
//! - **wallet**: append-only per-user ledger (COD debits, return refunds)
//! - **storage**: redb persistence; one exclusive write transaction per
//!   command is the linearization point for all state
//! - **manager**: command execution pipeline and post-commit fan-out
//!
//! # Command Flow
//!
//! ```text
//! Command → DispatchManager → Action (validate, stage effects)
//!                 ↓
//!          Persist atomically (order/batch + logs + wallet postings)
//!                 ↓
//!          Broadcast log events, dispatch notifications (best effort)
//! ```

pub mod auth;
pub mod batches;
pub mod config;
pub mod directory;
pub mod gateway;
pub mod logger;
pub mod manager;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export public types
pub use config::Config;
pub use directory::Directory;
pub use gateway::{CallbackVerification, GatewayConfig, PaymentGateway};
pub use manager::{DispatchManager, EngineEvent};
pub use notify::{NotificationSink, RecordingSink, TracingSink};
pub use orders::{CommandContext, CommandHandler, CommandMetadata, OrderError};
pub use storage::{Storage, StorageError};
