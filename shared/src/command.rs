//! Commands submitted to the dispatch engine and their responses
//!
//! One command = one requested transition (or administrative edit). The
//! engine validates the whole command before writing anything; a rejected
//! command never leaves partial effects behind.

use crate::batch::CascadeOutcome;
use crate::models::Actor;
use crate::order::{OrderChanges, OrderStatus, Payer, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub actor: Actor,
    /// Client timestamp (Unix millis); kept for audit, the server clock is
    /// authoritative for log entries
    pub timestamp: i64,
    pub payload: CommandPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandPayload {
    // ========== Order state machine ==========
    CreateOrder {
        pickup_area_id: u64,
        delivery_area_id: u64,
        pickup_address: String,
        delivery_address: String,
        receiver_name: String,
        receiver_phone: String,
        distance_km: Decimal,
        weight_kg: Decimal,
        payer: Payer,
        payment_method: PaymentMethod,
    },
    AssignShipper {
        order_id: u64,
        shipper_id: u64,
        /// Target warehouse for the pickup phase; ignored elsewhere
        #[serde(skip_serializing_if = "Option::is_none")]
        warehouse_id: Option<u64>,
    },
    UpdateOrderStatus {
        order_id: u64,
        status: OrderStatus,
    },
    ConfirmCodCollection {
        order_id: u64,
    },
    MarkAsPaid {
        order_id: u64,
    },
    CancelOrder {
        order_id: u64,
    },
    StartTransfer {
        order_id: u64,
        delivery_warehouse_id: u64,
    },
    /// Applied after the gateway callback has been verified
    ConfirmOnlinePayment {
        order_id: u64,
        transaction_id: String,
    },
    EditOrder {
        order_id: u64,
        changes: OrderChanges,
    },
    DeleteOrder {
        order_id: u64,
    },

    // ========== Batch state machine ==========
    CreateBatch {
        order_ids: Vec<u64>,
        destination_warehouse_id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        shipper_id: Option<u64>,
    },
    AddOrdersToBatch {
        batch_id: u64,
        order_ids: Vec<u64>,
    },
    StartTransport {
        batch_id: u64,
    },
    CompleteTransport {
        batch_id: u64,
    },
    EditBatch {
        batch_id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        destination_warehouse_id: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shipper_id: Option<u64>,
    },
    DeleteBatch {
        batch_id: u64,
    },
}

/// Engine response to a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    /// Order created or affected, when a single order was the subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    /// Batch created or affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<u64>,
    /// Per-order outcomes of a batch cascade
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cascade: Vec<CascadeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            order_id: None,
            batch_id: None,
            cascade: Vec::new(),
            error: None,
        }
    }

    pub fn for_order(order_id: u64) -> Self {
        Self {
            order_id: Some(order_id),
            ..Self::ok()
        }
    }

    pub fn for_batch(batch_id: u64, cascade: Vec<CascadeOutcome>) -> Self {
        Self {
            batch_id: Some(batch_id),
            cascade,
            ..Self::ok()
        }
    }

    pub fn error(error: CommandError) -> Self {
        Self {
            success: false,
            order_id: None,
            batch_id: None,
            cascade: Vec::new(),
            error: Some(error),
        }
    }
}

/// Structured rejection with a human-readable reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Error taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    /// Role or area scope does not permit the operation
    Forbidden,
    /// Requested status unreachable from the current one (includes unmet
    /// payment preconditions and batch capacity)
    IllegalTransition,
    /// The entity changed under the caller; retry with fresh state
    ConcurrencyConflict,
    /// Rate lookup / gateway unavailable or invalid
    ExternalDependency,
    Internal,
}
