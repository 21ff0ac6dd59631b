//! DeleteOrder command handler
//!
//! Administrative hard delete, deliberately unconstrained by the state
//! machine. Stakeholders are notified; the record and its history are
//! gone afterwards, so the deletion itself is traced.

use async_trait::async_trait;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct DeleteOrderAction {
    pub order_id: u64,
}

#[async_trait]
impl CommandHandler for DeleteOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_admin(&metadata.actor)?;
        let order = ctx.load_order(self.order_id)?;

        let message = format!("Order {} was removed by an administrator", order.tracking_code);
        ctx.notify_customer(order.customer_id, message.clone(), Some(order.id));
        for employee_id in [order.dispatcher_id, order.shipper_id].into_iter().flatten() {
            ctx.notify_employee(employee_id, message.clone(), Some(order.id));
        }

        ctx.storage.remove_order_logs(ctx.txn, order.id)?;
        ctx.storage.remove_order(ctx.txn, order.id)?;

        tracing::warn!(
            order_id = order.id,
            tracking_code = %order.tracking_code,
            status = %order.status,
            deleted_by = %metadata.actor.user_id,
            "order hard-deleted"
        );
        Ok(CommandOutcome::for_order(order.id))
    }
}
