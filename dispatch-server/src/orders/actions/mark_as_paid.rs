//! MarkAsPaid command handler
//!
//! Administrative COD settlement after the fact. Unlike the shipper's
//! ConfirmCodCollection this posts nothing to any wallet; it only records
//! that the money was accounted for outside the ledger.

use async_trait::async_trait;
use shared::order::{OrderStatus, PaymentStatus};

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct MarkAsPaidAction {
    pub order_id: u64,
}

#[async_trait]
impl CommandHandler for MarkAsPaidAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_dispatcher_or_admin(&metadata.actor)?;
        let mut order = ctx.load_order(self.order_id)?;

        if !matches!(order.status, OrderStatus::Delivered | OrderStatus::Returned) {
            return Err(OrderError::IllegalTransition(format!(
                "settlement is only possible for delivered or returned orders, not {}",
                order.status
            )));
        }
        if order.payment_status == PaymentStatus::Paid {
            return Err(OrderError::IllegalTransition(
                "order is already paid".into(),
            ));
        }

        order.payment_status = PaymentStatus::Paid;
        order.payment_transaction_id = Some(format!("SETTLE-{}", uuid::Uuid::new_v4()));
        ctx.store_order(&order)?;
        ctx.log_order(order.id, order.status, "payment settled administratively", metadata)?;
        ctx.notify_customer(
            order.customer_id,
            format!("Payment recorded for order {}", order.tracking_code),
            Some(order.id),
        );

        Ok(CommandOutcome::for_order(order.id))
    }
}
