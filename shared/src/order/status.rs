//! Order status and payment enums
//!
//! `OrderStatus` is the heart of the state machine: every legal move is
//! derived from the current variant (see the engine's transition module).
//! No code outside the engine may write the status field.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Waiting for a dispatcher to assign a pickup shipper
    #[default]
    Pending,
    AssignedPickupShipper,
    Picking,
    /// Parcel is at the pickup warehouse
    PickupSuccess,
    PickupFailed,
    /// Travelling between areas (usually inside a batch)
    InterAreaTransporting,
    ArrivedDeliveryHub,
    AssignedDeliveryShipper,
    Delivering,
    Delivered,
    DeliveryFailed,
    /// Staged at the delivery hub, waiting for a return leg
    ReadyToReturn,
    /// Travelling back to the pickup terminal
    Returning,
    ArrivedPickupTerminal,
    AssignedReturnShipper,
    ReturningToSender,
    Returned,
    ReturnFailed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Returned | OrderStatus::Cancelled
        )
    }

    /// Statuses an order may hold while it is a member of a batch.
    pub fn is_valid_while_batched(&self) -> bool {
        matches!(
            self,
            OrderStatus::PickupSuccess
                | OrderStatus::ReadyToReturn
                | OrderStatus::InterAreaTransporting
                | OrderStatus::Returning
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::AssignedPickupShipper => "ASSIGNED_PICKUP_SHIPPER",
            OrderStatus::Picking => "PICKING",
            OrderStatus::PickupSuccess => "PICKUP_SUCCESS",
            OrderStatus::PickupFailed => "PICKUP_FAILED",
            OrderStatus::InterAreaTransporting => "INTER_AREA_TRANSPORTING",
            OrderStatus::ArrivedDeliveryHub => "ARRIVED_DELIVERY_HUB",
            OrderStatus::AssignedDeliveryShipper => "ASSIGNED_DELIVERY_SHIPPER",
            OrderStatus::Delivering => "DELIVERING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::DeliveryFailed => "DELIVERY_FAILED",
            OrderStatus::ReadyToReturn => "READY_TO_RETURN",
            OrderStatus::Returning => "RETURNING",
            OrderStatus::ArrivedPickupTerminal => "ARRIVED_PICKUP_TERMINAL",
            OrderStatus::AssignedReturnShipper => "ASSIGNED_RETURN_SHIPPER",
            OrderStatus::ReturningToSender => "RETURNING_TO_SENDER",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::ReturnFailed => "RETURN_FAILED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// Who pays the shipping fee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payer {
    Sender,
    Receiver,
}

/// How the fee is paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash collected by the shipper
    Cod,
    /// Online gateway payment
    Online,
}

/// Payment progress, orthogonal to the order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    /// Redirected to the gateway, awaiting its callback
    ProcessingOnline,
    Paid,
}
