//! AddOrdersToBatch command handler
//!
//! Same eligibility rules as CreateBatch against an existing Created
//! batch, plus the destination check: a forward order joining the batch
//! must actually be going where the batch is going.

use async_trait::async_trait;
use shared::batch::{BatchStatus, MAX_ORDERS_PER_BATCH};

use crate::auth;
use crate::batches::{BatchLeg, batch_leg, reconcile_origin};
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct AddOrdersToBatchAction {
    pub batch_id: u64,
    pub order_ids: Vec<u64>,
}

#[async_trait]
impl CommandHandler for AddOrdersToBatchAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let area_id = auth::dispatcher_area(&metadata.actor)?;
        let batch = ctx.load_batch(self.batch_id)?;

        if batch.status != BatchStatus::Created {
            return Err(OrderError::IllegalTransition(format!(
                "orders can only be added while the batch is CREATED, batch is {}",
                batch.status
            )));
        }
        if self.order_ids.is_empty() {
            return Err(OrderError::IllegalTransition("no orders given".into()));
        }

        let current = ctx.storage.orders_in_batch_txn(ctx.txn, batch.id)?;
        if current.len() + self.order_ids.len() > MAX_ORDERS_PER_BATCH {
            return Err(OrderError::IllegalTransition(format!(
                "batch {} would exceed {MAX_ORDERS_PER_BATCH} orders",
                batch.batch_code
            )));
        }

        let destination_area = ctx
            .directory
            .warehouse(batch.destination_warehouse_id)
            .ok_or(OrderError::WarehouseNotFound(batch.destination_warehouse_id))?
            .area_id;

        let mut members = Vec::with_capacity(self.order_ids.len());
        for &order_id in &self.order_ids {
            let order = ctx.load_order(order_id)?;
            let leg = batch_leg(&order, area_id)?;
            if leg == BatchLeg::Forward && order.delivery_area_id != destination_area {
                return Err(OrderError::IllegalTransition(format!(
                    "order {} is destined for area {}, the batch goes to area {destination_area}",
                    order.id, order.delivery_area_id
                )));
            }
            members.push((order, leg));
        }

        for (mut order, leg) in members {
            order.shipment_batch_id = Some(batch.id);
            reconcile_origin(&mut order, leg, batch.origin_warehouse_id);
            ctx.store_order(&order)?;
            ctx.log_order(
                order.id,
                order.status,
                format!("added to batch {}", batch.batch_code),
                metadata,
            )?;
        }

        ctx.log_batch(
            batch.id,
            batch.status,
            format!("{} orders added", self.order_ids.len()),
            metadata,
        )?;

        Ok(CommandOutcome::for_batch(batch.id))
    }
}
