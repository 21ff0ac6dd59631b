//! CancelOrder command handler
//!
//! Customers may withdraw an order as long as nothing has started moving.

use async_trait::async_trait;
use shared::order::OrderStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: u64,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;
        auth::ensure_order_owner(&metadata.actor, &order)?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::IllegalTransition(format!(
                "only pending orders can be cancelled, order is {}",
                order.status
            )));
        }

        order.status = OrderStatus::Cancelled;
        ctx.store_order(&order)?;
        ctx.log_order(order.id, OrderStatus::Cancelled, "cancelled by customer", metadata)?;

        let message = format!("Order {} was cancelled", order.tracking_code);
        ctx.notify(metadata.actor.user_id.clone(), message.clone(), Some(order.id));
        ctx.notify_dispatchers_in_area(order.pickup_area_id, &message, Some(order.id));
        if order.delivery_area_id != order.pickup_area_id {
            ctx.notify_dispatchers_in_area(order.delivery_area_id, &message, Some(order.id));
        }

        Ok(CommandOutcome::for_order(order.id))
    }
}
