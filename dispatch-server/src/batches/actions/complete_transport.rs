//! CompleteTransport command handler
//!
//! Arrival at the destination warehouse. Forward orders are handed to the
//! destination dispatcher (shipper cleared, new assignment required);
//! return orders reach their pickup terminal. Membership is cleared for
//! every member, including skipped anomalies, so a completed batch never
//! retains orders.

use async_trait::async_trait;
use shared::batch::{BatchStatus, CascadeOutcome, CascadeResult};
use shared::order::OrderStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct CompleteTransportAction {
    pub batch_id: u64,
}

#[async_trait]
impl CommandHandler for CompleteTransportAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut batch = ctx.load_batch(self.batch_id)?;

        if batch.status != BatchStatus::InTransit {
            return Err(OrderError::IllegalTransition(format!(
                "batch {} cannot arrive while {}",
                batch.batch_code, batch.status
            )));
        }

        let destination_area = ctx
            .directory
            .warehouse(batch.destination_warehouse_id)
            .ok_or(OrderError::WarehouseNotFound(batch.destination_warehouse_id))?
            .area_id;
        auth::ensure_dispatcher_in_area(&metadata.actor, destination_area)?;

        let members = ctx.storage.orders_in_batch_txn(ctx.txn, batch.id)?;
        let mut cascade = Vec::with_capacity(members.len());
        for mut order in members {
            order.shipment_batch_id = None;
            let new_status = match order.status {
                OrderStatus::InterAreaTransporting => {
                    order.shipper_id = None;
                    OrderStatus::ArrivedDeliveryHub
                }
                OrderStatus::Returning => OrderStatus::ArrivedPickupTerminal,
                found => {
                    tracing::warn!(
                        order_id = order.id,
                        batch_id = batch.id,
                        status = %found,
                        "batch member in unexpected status, released without advancing"
                    );
                    ctx.store_order(&order)?;
                    cascade.push(CascadeOutcome {
                        order_id: order.id,
                        result: CascadeResult::Skipped { found_status: found },
                    });
                    continue;
                }
            };
            order.status = new_status;
            ctx.store_order(&order)?;
            ctx.log_order(
                order.id,
                new_status,
                format!("arrived with batch {}", batch.batch_code),
                metadata,
            )?;
            cascade.push(CascadeOutcome {
                order_id: order.id,
                result: CascadeResult::Advanced { status: new_status },
            });
        }

        batch.status = BatchStatus::Completed;
        batch.completed_at = Some(metadata.timestamp);
        ctx.store_batch(&batch)?;
        ctx.log_batch(batch.id, BatchStatus::Completed, "transport completed", metadata)?;

        tracing::info!(batch_id = batch.id, orders = cascade.len(), "batch arrived");
        Ok(CommandOutcome {
            batch_id: Some(batch.id),
            order_id: None,
            cascade,
        })
    }
}
