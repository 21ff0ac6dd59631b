//! Order record and its append-only log

use super::status::{OrderStatus, Payer, PaymentMethod, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single shipment request.
///
/// Mutated exclusively through the engine's command actions; the status
/// field in particular only ever changes together with an appended
/// [`OrderLog`] entry in the same storage transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    /// Human-facing code, `MVD{ddMMyyyy}{id:04}`
    pub tracking_code: String,

    // Parties
    pub customer_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatcher_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipper_id: Option<u64>,

    // Route
    pub pickup_area_id: u64,
    pub delivery_area_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_warehouse_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_warehouse_id: Option<u64>,
    pub pickup_address: String,
    pub delivery_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,

    // Commercial
    pub distance_km: Decimal,
    pub weight_kg: Decimal,
    pub total_price: Decimal,
    pub payer: Payer,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_transaction_id: Option<String>,

    // Batch membership (set while travelling inside a batch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_batch_id: Option<u64>,

    pub status: OrderStatus,
    pub created_at: i64,
}

impl Order {
    /// Pickup and delivery in the same area (no inter-area leg needed).
    pub fn is_intra_area(&self) -> bool {
        self.pickup_area_id == self.delivery_area_id
    }

    pub fn is_batched(&self) -> bool {
        self.shipment_batch_id.is_some()
    }

    /// True when the sender chose to pay online; assignment is blocked
    /// until the gateway confirms.
    pub fn awaits_online_prepayment(&self) -> bool {
        self.payer == Payer::Sender
            && self.payment_method == PaymentMethod::Online
            && self.payment_status != PaymentStatus::Paid
    }
}

/// Tracking code derived from creation date + id, e.g. `MVD300820250042`.
pub(crate) fn tracking_code(created_at: i64, id: u64) -> String {
    let date = chrono::DateTime::from_timestamp_millis(created_at)
        .unwrap_or_default()
        .format("%d%m%Y");
    format!("MVD{date}{id:04}")
}

impl Order {
    /// Regenerate the tracking code from the stored creation date.
    pub fn derive_tracking_code(&self) -> String {
        tracking_code(self.created_at, self.id)
    }
}

/// Append-only history entry; one per accepted status change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLog {
    pub order_id: u64,
    pub status: OrderStatus,
    pub time: i64,
    pub note: String,
    /// User id of the actor who triggered the change
    pub updated_by: String,
}

/// Editable fields while an order is still Pending.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_area_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_area_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Decimal>,
}
