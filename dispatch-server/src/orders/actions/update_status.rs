//! UpdateOrderStatus command handler
//!
//! Runs the pure transition plan and applies its effects: the status
//! write, the history entry, the optional shipper hand-off and the
//! return-refund posting.

use async_trait::async_trait;
use shared::order::OrderStatus;
use shared::wallet::WalletTxnType;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
use crate::orders::transition::plan_transition;

#[derive(Debug, Clone)]
pub struct UpdateOrderStatusAction {
    pub order_id: u64,
    pub status: OrderStatus,
}

#[async_trait]
impl CommandHandler for UpdateOrderStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;
        auth::ensure_update_scope(&metadata.actor, &order)?;

        let effects = plan_transition(&order, self.status, &metadata.actor)?;

        order.status = effects.new_status;
        if effects.clear_shipper {
            order.shipper_id = None;
        }
        if effects.refund_customer {
            let customer = ctx
                .directory
                .customer(order.customer_id)
                .ok_or(OrderError::CustomerNotFound(order.customer_id))?;
            ctx.post_wallet(
                &customer.user_id,
                order.total_price,
                WalletTxnType::Refund,
                format!("Refund for returned order {}", order.tracking_code),
                Some(order.id),
                metadata.timestamp,
            )?;
        }

        ctx.store_order(&order)?;
        let note = if effects.refund_customer {
            format!("status changed to {}; shipping fee refunded", effects.new_status)
        } else {
            format!("status changed to {}", effects.new_status)
        };
        ctx.log_order(order.id, effects.new_status, note, metadata)?;
        ctx.notify_order_stakeholders(
            &order,
            &format!("Order {} is now {}", order.tracking_code, effects.new_status),
            &metadata.actor,
        );

        tracing::info!(order_id = order.id, status = %effects.new_status, "order transitioned");
        Ok(CommandOutcome::for_order(order.id))
    }
}
