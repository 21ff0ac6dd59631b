//! ConfirmOnlinePayment command handler
//!
//! Applied by the manager after the gateway callback has been verified.
//! A duplicate callback for an already-paid order is a no-op success so
//! gateway retries stay harmless.

use async_trait::async_trait;
use shared::order::{PaymentMethod, PaymentStatus};

use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct ConfirmOnlinePaymentAction {
    pub order_id: u64,
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for ConfirmOnlinePaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;

        if order.payment_status == PaymentStatus::Paid {
            tracing::info!(order_id = order.id, "duplicate payment callback ignored");
            return Ok(CommandOutcome::for_order(order.id));
        }
        if order.payment_method != PaymentMethod::Online {
            return Err(OrderError::IllegalTransition(
                "order is not paid through the gateway".into(),
            ));
        }

        order.payment_status = PaymentStatus::Paid;
        order.payment_transaction_id = Some(self.transaction_id.clone());
        ctx.store_order(&order)?;
        ctx.log_order(order.id, order.status, "online payment confirmed", metadata)?;
        ctx.notify_customer(
            order.customer_id,
            format!("Payment confirmed for order {}", order.tracking_code),
            Some(order.id),
        );

        Ok(CommandOutcome::for_order(order.id))
    }
}
