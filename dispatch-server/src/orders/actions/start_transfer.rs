//! StartTransfer command handler
//!
//! Manual single-order departure for the inter-area leg. Most traffic
//! moves through the batch machine instead; this is the one-off path.

use async_trait::async_trait;
use shared::order::OrderStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
use crate::orders::transition::plan_transition;

#[derive(Debug, Clone)]
pub struct StartTransferAction {
    pub order_id: u64,
    pub delivery_warehouse_id: u64,
}

#[async_trait]
impl CommandHandler for StartTransferAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;
        auth::ensure_dispatcher_in_area(&metadata.actor, order.pickup_area_id)?;

        // Reuses the status/batch/intra-area gates of the transition table
        let effects = plan_transition(&order, OrderStatus::InterAreaTransporting, &metadata.actor)?;

        let warehouse = ctx
            .directory
            .warehouse(self.delivery_warehouse_id)
            .ok_or(OrderError::WarehouseNotFound(self.delivery_warehouse_id))?;
        if warehouse.area_id != order.delivery_area_id {
            return Err(OrderError::IllegalTransition(format!(
                "warehouse {} is not in the delivery area",
                self.delivery_warehouse_id
            )));
        }

        order.status = effects.new_status;
        order.delivery_warehouse_id = Some(self.delivery_warehouse_id);
        ctx.store_order(&order)?;
        ctx.log_order(
            order.id,
            effects.new_status,
            format!("departed for warehouse {}", warehouse.name),
            metadata,
        )?;
        ctx.notify_order_stakeholders(
            &order,
            &format!("Order {} is in inter-area transport", order.tracking_code),
            &metadata.actor,
        );

        Ok(CommandOutcome::for_order(order.id))
    }
}
