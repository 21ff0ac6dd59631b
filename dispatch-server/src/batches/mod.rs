//! Shipment batch state machine
//!
//! Batches consolidate same-route orders into one linehaul trip. The
//! actions here own the batch status and drive the member orders' bulk
//! transitions; eligibility and leg detection are shared by Create and
//! AddOrdersToBatch.

use chrono::{TimeZone, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use shared::order::{Order, OrderStatus};

use crate::orders::OrderError;

pub mod actions;

pub use actions::BatchAction;

/// Which direction a member order travels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchLeg {
    /// PickupSuccess order heading to its delivery area
    Forward,
    /// ReadyToReturn order heading back to its pickup area
    Return,
}

/// Check a candidate order against the batching eligibility rules and
/// classify its leg. `area_id` is the acting dispatcher's home area.
pub fn batch_leg(order: &Order, area_id: u64) -> Result<BatchLeg, OrderError> {
    if let Some(batch_id) = order.shipment_batch_id {
        return Err(OrderError::IllegalTransition(format!(
            "order {} already belongs to batch {batch_id}",
            order.id
        )));
    }
    match order.status {
        OrderStatus::PickupSuccess => {
            if order.is_intra_area() {
                Err(OrderError::IllegalTransition(format!(
                    "order {} is intra-area and never travels in a batch",
                    order.id
                )))
            } else if order.pickup_area_id != area_id {
                Err(OrderError::Forbidden(format!(
                    "order {} was picked up outside this dispatcher's area",
                    order.id
                )))
            } else {
                Ok(BatchLeg::Forward)
            }
        }
        OrderStatus::ReadyToReturn => {
            if order.delivery_area_id != area_id {
                Err(OrderError::Forbidden(format!(
                    "order {} is staged outside this dispatcher's area",
                    order.id
                )))
            } else {
                Ok(BatchLeg::Return)
            }
        }
        status => Err(OrderError::IllegalTransition(format!(
            "order {} cannot be batched while {status}",
            order.id
        ))),
    }
}

/// The warehouse the order currently sits in, per leg
pub fn origin_warehouse_of(order: &Order, leg: BatchLeg) -> Option<u64> {
    match leg {
        BatchLeg::Forward => order.pickup_warehouse_id,
        BatchLeg::Return => order.delivery_warehouse_id,
    }
}

/// Pin the order's warehouse pointer to the batch origin so member
/// records agree on where the parcel is
pub fn reconcile_origin(order: &mut Order, leg: BatchLeg, origin_warehouse_id: u64) {
    match leg {
        BatchLeg::Forward => order.pickup_warehouse_id = Some(origin_warehouse_id),
        BatchLeg::Return => order.delivery_warehouse_id = Some(origin_warehouse_id),
    }
}

/// Batch code `LO_{yyMMdd}_{XXXX}` with a random uppercase suffix
pub fn generate_batch_code(now: i64) -> String {
    let date = Utc
        .timestamp_millis_opt(now)
        .single()
        .unwrap_or_else(Utc::now)
        .format("%y%m%d");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("LO_{date}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn forward_and_return_legs() {
        let forward = testutil::sample_order(1, OrderStatus::PickupSuccess);
        assert_eq!(batch_leg(&forward, testutil::AREA_HN).unwrap(), BatchLeg::Forward);

        let mut ret = testutil::sample_order(2, OrderStatus::ReadyToReturn);
        ret.delivery_warehouse_id = Some(testutil::WAREHOUSE_HCM);
        assert_eq!(batch_leg(&ret, testutil::AREA_HCM).unwrap(), BatchLeg::Return);
    }

    #[test]
    fn wrong_area_or_status_is_rejected() {
        let forward = testutil::sample_order(1, OrderStatus::PickupSuccess);
        assert!(matches!(
            batch_leg(&forward, testutil::AREA_HCM),
            Err(OrderError::Forbidden(_))
        ));

        let pending = testutil::sample_order(2, OrderStatus::Pending);
        assert!(matches!(
            batch_leg(&pending, testutil::AREA_HN),
            Err(OrderError::IllegalTransition(_))
        ));

        let mut intra = testutil::sample_order(3, OrderStatus::PickupSuccess);
        intra.delivery_area_id = testutil::AREA_HN;
        assert!(matches!(
            batch_leg(&intra, testutil::AREA_HN),
            Err(OrderError::IllegalTransition(_))
        ));

        let mut batched = testutil::sample_order(4, OrderStatus::PickupSuccess);
        batched.shipment_batch_id = Some(7);
        assert!(matches!(
            batch_leg(&batched, testutil::AREA_HN),
            Err(OrderError::IllegalTransition(_))
        ));
    }

    #[test]
    fn batch_code_shape() {
        let code = generate_batch_code(testutil::NOW);
        assert!(code.starts_with("LO_250830_"), "{code}");
        assert_eq!(code.len(), "LO_250830_".len() + 4);
        assert!(code.chars().skip(10).all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
