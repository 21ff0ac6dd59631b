//! StartTransport command handler
//!
//! The truck departs: the batch moves to InTransit and every member
//! order advances to its travelling status. A member found in an
//! unexpected status is skipped and surfaced in the cascade outcome
//! instead of aborting the departure.

use async_trait::async_trait;
use shared::batch::{BatchStatus, CascadeOutcome, CascadeResult};
use shared::order::OrderStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct StartTransportAction {
    pub batch_id: u64,
}

#[async_trait]
impl CommandHandler for StartTransportAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_dispatcher_or_admin(&metadata.actor)?;
        let mut batch = ctx.load_batch(self.batch_id)?;

        if batch.status != BatchStatus::Created {
            return Err(OrderError::IllegalTransition(format!(
                "batch {} cannot depart while {}",
                batch.batch_code, batch.status
            )));
        }

        let members = ctx.storage.orders_in_batch_txn(ctx.txn, batch.id)?;
        let mut cascade = Vec::with_capacity(members.len());
        for mut order in members {
            let new_status = match order.status {
                OrderStatus::PickupSuccess => {
                    order.delivery_warehouse_id = Some(batch.destination_warehouse_id);
                    OrderStatus::InterAreaTransporting
                }
                OrderStatus::ReadyToReturn => OrderStatus::Returning,
                found => {
                    tracing::warn!(
                        order_id = order.id,
                        batch_id = batch.id,
                        status = %found,
                        "batch member in unexpected status, skipped on departure"
                    );
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
                format!("departed with batch {}", batch.batch_code),
                metadata,
            )?;
            cascade.push(CascadeOutcome {
                order_id: order.id,
                result: CascadeResult::Advanced { status: new_status },
            });
        }

        batch.status = BatchStatus::InTransit;
        ctx.store_batch(&batch)?;
        ctx.log_batch(batch.id, BatchStatus::InTransit, "transport started", metadata)?;

        tracing::info!(batch_id = batch.id, orders = cascade.len(), "batch departed");
        Ok(CommandOutcome {
            batch_id: Some(batch.id),
            order_id: None,
            cascade,
        })
    }
}
