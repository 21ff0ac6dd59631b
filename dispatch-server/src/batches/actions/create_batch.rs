//! CreateBatch command handler
//!
//! Gathers eligible orders from the dispatcher's own area into a new
//! Created batch. Batching is a staging operation: member orders keep
//! their status until StartTransport.

use async_trait::async_trait;
use shared::batch::{BatchStatus, MAX_ORDERS_PER_BATCH, ShipmentBatch};

use crate::auth;
use crate::batches::{batch_leg, generate_batch_code, origin_warehouse_of, reconcile_origin};
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct CreateBatchAction {
    pub order_ids: Vec<u64>,
    pub destination_warehouse_id: u64,
    pub shipper_id: Option<u64>,
}

#[async_trait]
impl CommandHandler for CreateBatchAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let area_id = auth::dispatcher_area(&metadata.actor)?;

        if self.order_ids.is_empty() {
            return Err(OrderError::IllegalTransition(
                "a batch needs at least one order".into(),
            ));
        }
        if self.order_ids.len() > MAX_ORDERS_PER_BATCH {
            return Err(OrderError::IllegalTransition(format!(
                "a batch may carry at most {MAX_ORDERS_PER_BATCH} orders"
            )));
        }
        ctx.directory
            .warehouse(self.destination_warehouse_id)
            .ok_or(OrderError::WarehouseNotFound(self.destination_warehouse_id))?;
        if let Some(shipper_id) = self.shipper_id {
            ctx.directory
                .shipper(shipper_id)
                .ok_or(OrderError::ShipperNotFound(shipper_id))?;
        }

        // Validate the whole member set before writing anything
        let mut members = Vec::with_capacity(self.order_ids.len());
        for &order_id in &self.order_ids {
            let order = ctx.load_order(order_id)?;
            let leg = batch_leg(&order, area_id)?;
            members.push((order, leg));
        }

        // Origin: the first order's current warehouse, or any warehouse in
        // the dispatcher's area when that field was never set
        let (first_order, first_leg) = &members[0];
        let origin_warehouse_id = origin_warehouse_of(first_order, *first_leg)
            .or_else(|| ctx.directory.warehouse_in_area(area_id).map(|w| w.id))
            .ok_or_else(|| {
                OrderError::IllegalTransition(format!(
                    "no origin warehouse could be determined in area {area_id}"
                ))
            })?;

        let id = ctx.storage.next_batch_id(ctx.txn)?;
        let batch = ShipmentBatch {
            id,
            batch_code: generate_batch_code(metadata.timestamp),
            origin_warehouse_id,
            destination_warehouse_id: self.destination_warehouse_id,
            shipper_id: self.shipper_id,
            status: BatchStatus::Created,
            created_at: metadata.timestamp,
            completed_at: None,
        };
        ctx.store_batch(&batch)?;

        for (mut order, leg) in members {
            order.shipment_batch_id = Some(id);
            reconcile_origin(&mut order, leg, origin_warehouse_id);
            ctx.store_order(&order)?;
        }

        ctx.log_batch(
            id,
            BatchStatus::Created,
            format!("batch {} created with {} orders", batch.batch_code, self.order_ids.len()),
            metadata,
        )?;

        tracing::info!(batch_id = id, batch_code = %batch.batch_code, orders = self.order_ids.len(), "batch created");
        Ok(CommandOutcome::for_batch(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testutil;
    use shared::order::OrderStatus;

    async fn create(
        orders: Vec<shared::order::Order>,
        actor: shared::models::Actor,
        order_ids: Vec<u64>,
    ) -> (Storage, Result<CommandOutcome, OrderError>) {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        for order in &orders {
            storage.store_order(&txn, order).unwrap();
        }
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(actor);
        let result = CreateBatchAction {
            order_ids,
            destination_warehouse_id: testutil::WAREHOUSE_HCM,
            shipper_id: Some(testutil::SHIPPER_HN),
        }
        .execute(&mut ctx, &metadata)
        .await;
        drop(ctx);
        txn.commit().unwrap();
        (storage, result)
    }

    #[tokio::test]
    async fn stages_eligible_orders_without_changing_status() {
        let orders = vec![
            testutil::sample_order(1, OrderStatus::PickupSuccess),
            testutil::sample_order(2, OrderStatus::PickupSuccess),
        ];
        let (storage, result) = create(orders, testutil::dispatcher_hn(), vec![1, 2]).await;
        let batch_id = result.unwrap().batch_id.unwrap();

        let batch = storage.get_batch(batch_id).unwrap().unwrap();
        assert_eq!(batch.status, BatchStatus::Created);
        assert_eq!(batch.origin_warehouse_id, testutil::WAREHOUSE_HN);
        assert!(batch.batch_code.starts_with("LO_250830_"));

        for id in [1, 2] {
            let order = storage.get_order(id).unwrap().unwrap();
            assert_eq!(order.shipment_batch_id, Some(batch_id));
            assert_eq!(order.status, OrderStatus::PickupSuccess);
        }
        assert_eq!(storage.batch_logs(batch_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_ineligible_order_rejects_the_whole_batch() {
        let orders = vec![
            testutil::sample_order(1, OrderStatus::PickupSuccess),
            testutil::sample_order(2, OrderStatus::Picking),
        ];
        let (storage, result) = create(orders, testutil::dispatcher_hn(), vec![1, 2]).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
        assert_eq!(storage.get_order(1).unwrap().unwrap().shipment_batch_id, None);
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let (_, result) = create(
            Vec::new(),
            testutil::dispatcher_hn(),
            (1..=51).collect(),
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn empty_member_list_is_rejected() {
        let (_, result) = create(Vec::new(), testutil::dispatcher_hn(), Vec::new()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn origin_falls_back_to_an_area_warehouse() {
        let mut order = testutil::sample_order(1, OrderStatus::PickupSuccess);
        order.pickup_warehouse_id = None;
        let (storage, result) = create(vec![order], testutil::dispatcher_hn(), vec![1]).await;
        let batch_id = result.unwrap().batch_id.unwrap();
        let batch = storage.get_batch(batch_id).unwrap().unwrap();
        assert_eq!(batch.origin_warehouse_id, testutil::WAREHOUSE_HN);
        // The member's warehouse pointer was repaired to match
        assert_eq!(
            storage.get_order(1).unwrap().unwrap().pickup_warehouse_id,
            Some(testutil::WAREHOUSE_HN)
        );
    }

    #[tokio::test]
    async fn only_dispatchers_create_batches() {
        let orders = vec![testutil::sample_order(1, OrderStatus::PickupSuccess)];
        let (_, result) = create(orders, testutil::shipper_hn(), vec![1]).await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }
}
