//! ConfirmCodCollection command handler
//!
//! The assigned shipper reports collecting the COD amount in cash. The
//! order becomes Paid and the shipper's own wallet is debited: the cash
//! in their pocket is owed to the company until settlement.

use async_trait::async_trait;
use shared::order::{PaymentMethod, PaymentStatus};
use shared::wallet::WalletTxnType;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct ConfirmCodCollectionAction {
    pub order_id: u64,
}

#[async_trait]
impl CommandHandler for ConfirmCodCollectionAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;
        auth::ensure_assigned_shipper(&metadata.actor, &order)?;

        if order.payment_method != PaymentMethod::Cod {
            return Err(OrderError::IllegalTransition(
                "order is not paid by COD".into(),
            ));
        }
        if order.payment_status == PaymentStatus::Paid {
            return Err(OrderError::IllegalTransition(
                "payment has already been collected".into(),
            ));
        }

        order.payment_status = PaymentStatus::Paid;
        order.payment_transaction_id = Some(format!("COD-{}", uuid::Uuid::new_v4()));

        ctx.post_wallet(
            &metadata.actor.user_id,
            -order.total_price,
            WalletTxnType::CodDeduct,
            format!("COD collected for order {}", order.tracking_code),
            Some(order.id),
            metadata.timestamp,
        )?;

        ctx.store_order(&order)?;
        ctx.log_order(order.id, order.status, "COD payment collected", metadata)?;

        ctx.notify_customer(
            order.customer_id,
            format!("Payment received for order {}", order.tracking_code),
            Some(order.id),
        );
        if let Some(dispatcher_id) = order.dispatcher_id {
            ctx.notify_employee(
                dispatcher_id,
                format!("COD collected for order {}", order.tracking_code),
                Some(order.id),
            );
        }

        Ok(CommandOutcome::for_order(order.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testutil;
    use rust_decimal::Decimal;
    use shared::order::OrderStatus;

    async fn confirm(
        order: shared::order::Order,
        actor: shared::models::Actor,
    ) -> (Storage, Result<CommandOutcome, OrderError>) {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(actor);
        let result = ConfirmCodCollectionAction { order_id: order.id }
            .execute(&mut ctx, &metadata)
            .await;
        drop(ctx);
        txn.commit().unwrap();
        (storage, result)
    }

    #[tokio::test]
    async fn marks_paid_and_debits_the_shipper() {
        let order = testutil::sample_order(1, OrderStatus::Picking);
        let (storage, result) = confirm(order, testutil::shipper_hn()).await;
        result.unwrap();

        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert!(stored.payment_transaction_id.unwrap().starts_with("COD-"));
        // Status itself is untouched
        assert_eq!(stored.status, OrderStatus::Picking);

        let wallet = storage.get_wallet("ship-hn").unwrap().unwrap();
        assert_eq!(wallet.balance, Decimal::from(-82));
        let txns = storage.wallet_transactions("ship-hn").unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].txn_type, WalletTxnType::CodDeduct);
    }

    #[tokio::test]
    async fn already_paid_is_rejected() {
        let mut order = testutil::sample_order(1, OrderStatus::Picking);
        order.payment_status = PaymentStatus::Paid;
        let (storage, result) = confirm(order, testutil::shipper_hn()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
        assert!(storage.get_wallet("ship-hn").unwrap().is_none());
    }

    #[tokio::test]
    async fn only_the_assigned_shipper_may_confirm() {
        let order = testutil::sample_order(1, OrderStatus::Picking);
        let (_, result) = confirm(order, testutil::shipper_hcm()).await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn online_orders_are_rejected() {
        let mut order = testutil::sample_order(1, OrderStatus::Picking);
        order.payment_method = PaymentMethod::Online;
        let (_, result) = confirm(order, testutil::shipper_hn()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }
}
