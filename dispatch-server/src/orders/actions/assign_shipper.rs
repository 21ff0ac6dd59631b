//! AssignShipper command handler
//!
//! One command serves all three assignment legs; the phase is derived
//! from the order's current status, never from the request.

use async_trait::async_trait;
use shared::order::OrderStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
use crate::orders::transition::{AssignPhase, assign_phase};

#[derive(Debug, Clone)]
pub struct AssignShipperAction {
    pub order_id: u64,
    pub shipper_id: u64,
    /// Target warehouse; required for the pickup phase
    pub warehouse_id: Option<u64>,
}

#[async_trait]
impl CommandHandler for AssignShipperAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;

        if let Some(batch_id) = order.shipment_batch_id {
            return Err(OrderError::IllegalTransition(format!(
                "order {} is travelling in batch {batch_id} and cannot be reassigned",
                order.id
            )));
        }
        if order.awaits_online_prepayment() {
            return Err(OrderError::IllegalTransition(
                "online payment has not been confirmed yet".into(),
            ));
        }

        let phase = assign_phase(&order)?;
        // Which area the acting dispatcher and the shipper must belong to
        let required_area = match phase {
            AssignPhase::Pickup | AssignPhase::Return => order.pickup_area_id,
            AssignPhase::Delivery => order.delivery_area_id,
        };
        auth::ensure_dispatcher_in_area(&metadata.actor, required_area)?;

        let shipper = ctx
            .directory
            .shipper(self.shipper_id)
            .ok_or(OrderError::ShipperNotFound(self.shipper_id))?;
        if shipper.area_id != required_area {
            return Err(OrderError::Forbidden(format!(
                "shipper {} is not scoped to area {required_area}",
                shipper.id
            )));
        }

        let (new_status, task) = match phase {
            AssignPhase::Pickup => {
                let warehouse_id = self.warehouse_id.ok_or_else(|| {
                    OrderError::IllegalTransition(
                        "pickup assignment requires a target warehouse".into(),
                    )
                })?;
                let warehouse = ctx
                    .directory
                    .warehouse(warehouse_id)
                    .ok_or(OrderError::WarehouseNotFound(warehouse_id))?;
                if warehouse.area_id != order.pickup_area_id {
                    return Err(OrderError::Forbidden(format!(
                        "warehouse {warehouse_id} is not in the pickup area"
                    )));
                }
                order.pickup_warehouse_id = Some(warehouse_id);
                if metadata.actor.employee_id.is_some() {
                    order.dispatcher_id = metadata.actor.employee_id;
                }
                (OrderStatus::AssignedPickupShipper, "pickup")
            }
            AssignPhase::Delivery => {
                if let Some(warehouse_id) = self.warehouse_id {
                    let warehouse = ctx
                        .directory
                        .warehouse(warehouse_id)
                        .ok_or(OrderError::WarehouseNotFound(warehouse_id))?;
                    if warehouse.area_id != order.delivery_area_id {
                        return Err(OrderError::Forbidden(format!(
                            "warehouse {warehouse_id} is not in the delivery area"
                        )));
                    }
                    order.delivery_warehouse_id = Some(warehouse_id);
                }
                (OrderStatus::AssignedDeliveryShipper, "delivery")
            }
            AssignPhase::Return => (OrderStatus::AssignedReturnShipper, "return"),
        };

        order.shipper_id = Some(shipper.id);
        order.status = new_status;
        ctx.store_order(&order)?;
        ctx.log_order(
            order.id,
            new_status,
            format!("{} assigned to {} by {}", shipper.name, task, metadata.actor.display_name),
            metadata,
        )?;

        ctx.notify(
            shipper.user_id.clone(),
            format!("You were assigned the {task} task for order {}", order.tracking_code),
            Some(order.id),
        );
        ctx.notify_customer(
            order.customer_id,
            format!("A shipper was assigned to order {}", order.tracking_code),
            Some(order.id),
        );

        Ok(CommandOutcome::for_order(order.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testutil;
    use shared::order::PaymentStatus;

    async fn assign(
        order: shared::order::Order,
        actor: shared::models::Actor,
        shipper_id: u64,
        warehouse_id: Option<u64>,
    ) -> (Storage, Result<CommandOutcome, OrderError>) {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(actor);
        let action = AssignShipperAction {
            order_id: order.id,
            shipper_id,
            warehouse_id,
        };
        let result = action.execute(&mut ctx, &metadata).await;
        drop(ctx);
        txn.commit().unwrap();
        (storage, result)
    }

    #[tokio::test]
    async fn pickup_assignment_sets_warehouse_and_parties() {
        let mut order = testutil::sample_order(1, OrderStatus::Pending);
        order.shipper_id = None;
        order.dispatcher_id = None;
        order.pickup_warehouse_id = None;

        let (storage, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HN,
            Some(testutil::WAREHOUSE_HN),
        )
        .await;
        result.unwrap();

        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::AssignedPickupShipper);
        assert_eq!(stored.shipper_id, Some(testutil::SHIPPER_HN));
        assert_eq!(stored.dispatcher_id, Some(testutil::DISPATCHER_HN));
        assert_eq!(stored.pickup_warehouse_id, Some(testutil::WAREHOUSE_HN));
        assert_eq!(storage.order_logs(1).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pickup_requires_a_warehouse() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let (_, result) = assign(order, testutil::dispatcher_hn(), testutil::SHIPPER_HN, None).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn dispatcher_outside_pickup_area_is_rejected() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let (_, result) = assign(
            order,
            testutil::dispatcher_hcm(),
            testutil::SHIPPER_HN,
            Some(testutil::WAREHOUSE_HN),
        )
        .await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn shipper_area_must_match_phase_area() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let (_, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HCM,
            Some(testutil::WAREHOUSE_HN),
        )
        .await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn delivery_phase_before_pickup_is_rejected() {
        // An order still heading to pickup cannot take a delivery
        // assignment, and the inter-area PickupSuccess state is not
        // assignable either
        let order = testutil::sample_order(1, OrderStatus::AssignedPickupShipper);
        let (_, result) = assign(
            order,
            testutil::dispatcher_hcm(),
            testutil::SHIPPER_HCM,
            None,
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));

        let order = testutil::sample_order(2, OrderStatus::PickupSuccess);
        let (_, result) = assign(
            order,
            testutil::dispatcher_hcm(),
            testutil::SHIPPER_HCM,
            None,
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn delivery_assignment_at_the_hub() {
        let mut order = testutil::sample_order(1, OrderStatus::ArrivedDeliveryHub);
        order.shipper_id = None;
        let (storage, result) = assign(
            order,
            testutil::dispatcher_hcm(),
            testutil::SHIPPER_HCM,
            Some(testutil::WAREHOUSE_HCM),
        )
        .await;
        result.unwrap();

        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::AssignedDeliveryShipper);
        assert_eq!(stored.shipper_id, Some(testutil::SHIPPER_HCM));
        assert_eq!(stored.delivery_warehouse_id, Some(testutil::WAREHOUSE_HCM));
    }

    #[tokio::test]
    async fn intra_area_pickup_success_takes_delivery_assignment() {
        let mut order = testutil::sample_order(1, OrderStatus::PickupSuccess);
        order.delivery_area_id = testutil::AREA_HN;
        let (storage, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HN,
            None,
        )
        .await;
        result.unwrap();
        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::AssignedDeliveryShipper);
    }

    #[tokio::test]
    async fn return_assignment_at_pickup_terminal() {
        let mut order = testutil::sample_order(1, OrderStatus::ArrivedPickupTerminal);
        order.shipper_id = None;
        let (storage, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HN,
            None,
        )
        .await;
        result.unwrap();
        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::AssignedReturnShipper);
    }

    #[tokio::test]
    async fn unconfirmed_online_prepayment_blocks_assignment() {
        let mut order = testutil::sample_order(1, OrderStatus::Pending);
        order.payment_method = shared::order::PaymentMethod::Online;
        order.payment_status = PaymentStatus::ProcessingOnline;
        let (_, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HN,
            Some(testutil::WAREHOUSE_HN),
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn batched_orders_cannot_be_assigned() {
        let mut order = testutil::sample_order(1, OrderStatus::PickupSuccess);
        order.delivery_area_id = testutil::AREA_HN;
        order.shipment_batch_id = Some(9);
        let (_, result) = assign(
            order,
            testutil::dispatcher_hn(),
            testutil::SHIPPER_HN,
            None,
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }
}
