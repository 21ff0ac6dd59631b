//! Shipment batch domain types
//!
//! A batch consolidates same-route orders into one linehaul trip between
//! two warehouses. Its status only moves forward: Created -> InTransit ->
//! Completed.

use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// Maximum number of orders one batch may carry.
pub const MAX_ORDERS_PER_BATCH: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Staging: orders are gathered, the truck has not left
    #[default]
    Created,
    InTransit,
    Completed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BatchStatus::Created => "CREATED",
            BatchStatus::InTransit => "IN_TRANSIT",
            BatchStatus::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

/// Consolidated transport unit between two warehouses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentBatch {
    pub id: u64,
    /// Human-facing code, `LO_{yyMMdd}_{XXXX}`
    pub batch_code: String,
    pub origin_warehouse_id: u64,
    pub destination_warehouse_id: u64,
    /// Linehaul driver; None when the trip is outsourced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipper_id: Option<u64>,
    pub status: BatchStatus,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Append-only batch history entry, same contract as `OrderLog`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentBatchLog {
    pub batch_id: u64,
    pub status: BatchStatus,
    pub time: i64,
    pub note: String,
    pub updated_by: String,
}

/// Per-order result of a batch cascade (StartTransport / CompleteTransport).
///
/// An order found in an unexpected status is skipped rather than aborting
/// the whole batch transition; the skip is surfaced here so callers can see
/// the anomaly instead of it hiding in a loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CascadeOutcome {
    pub order_id: u64,
    pub result: CascadeResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CascadeResult {
    Advanced { status: OrderStatus },
    Skipped { found_status: OrderStatus },
}
