//! CreateOrder command handler
//!
//! Prices the route from both endpoint rate cards, generates the tracking
//! code and opens the order in Pending.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::order::{Order, OrderStatus, Payer, PaymentMethod, PaymentStatus};

use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
use crate::pricing;

#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub pickup_area_id: u64,
    pub delivery_area_id: u64,
    pub pickup_address: String,
    pub delivery_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub distance_km: Decimal,
    pub weight_kg: Decimal,
    pub payer: Payer,
    pub payment_method: PaymentMethod,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let customer_id = match (metadata.actor.is_customer(), metadata.actor.customer_id) {
            (true, Some(id)) => id,
            _ => {
                return Err(OrderError::Forbidden(
                    "only a customer may create an order".into(),
                ));
            }
        };

        // Price lookup blocks creation when either endpoint has no rates
        let pickup_rate = ctx
            .directory
            .rate_card(self.pickup_area_id)
            .ok_or(OrderError::MissingRateCard(self.pickup_area_id))?;
        let delivery_rate = ctx
            .directory
            .rate_card(self.delivery_area_id)
            .ok_or(OrderError::MissingRateCard(self.delivery_area_id))?;
        let total_price =
            pricing::price_for(&pickup_rate, &delivery_rate, self.distance_km, self.weight_kg);

        // Sender paying online goes through the gateway before assignment
        let payment_status =
            if self.payer == Payer::Sender && self.payment_method == PaymentMethod::Online {
                PaymentStatus::ProcessingOnline
            } else {
                PaymentStatus::Unpaid
            };

        let id = ctx.storage.next_order_id(ctx.txn)?;
        let mut order = Order {
            id,
            tracking_code: String::new(),
            customer_id,
            dispatcher_id: None,
            shipper_id: None,
            pickup_area_id: self.pickup_area_id,
            delivery_area_id: self.delivery_area_id,
            pickup_warehouse_id: None,
            delivery_warehouse_id: None,
            pickup_address: self.pickup_address.clone(),
            delivery_address: self.delivery_address.clone(),
            receiver_name: self.receiver_name.clone(),
            receiver_phone: self.receiver_phone.clone(),
            distance_km: self.distance_km,
            weight_kg: self.weight_kg,
            total_price,
            payer: self.payer,
            payment_method: self.payment_method,
            payment_status,
            payment_transaction_id: None,
            shipment_batch_id: None,
            status: OrderStatus::Pending,
            created_at: metadata.timestamp,
        };
        order.tracking_code = order.derive_tracking_code();

        ctx.store_order(&order)?;
        ctx.log_order(id, OrderStatus::Pending, "order created", metadata)?;

        ctx.notify(
            metadata.actor.user_id.clone(),
            format!("Order {} created", order.tracking_code),
            Some(id),
        );
        ctx.notify_dispatchers_in_area(
            self.pickup_area_id,
            &format!("New order {} awaiting pickup assignment", order.tracking_code),
            Some(id),
        );

        tracing::info!(order_id = id, tracking_code = %order.tracking_code, "order created");
        Ok(CommandOutcome::for_order(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testutil;

    fn action() -> CreateOrderAction {
        CreateOrderAction {
            pickup_area_id: testutil::AREA_HN,
            delivery_area_id: testutil::AREA_HCM,
            pickup_address: "12 Trang Thi".into(),
            delivery_address: "34 Le Loi".into(),
            receiver_name: "Receiver".into(),
            receiver_phone: "0900000000".into(),
            distance_km: Decimal::from(10),
            weight_kg: Decimal::from(2),
            payer: Payer::Sender,
            payment_method: PaymentMethod::Cod,
        }
    }

    #[tokio::test]
    async fn creates_pending_cod_order() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::customer());

        let outcome = action().execute(&mut ctx, &metadata).await.unwrap();
        let order_id = outcome.order_id.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order(order_id).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        // base 10+20, 10km * (1+3), 2kg * (2+4)
        assert_eq!(order.total_price, Decimal::from(82));
        assert_eq!(order.tracking_code, format!("MVD30082025{order_id:04}"));

        let logs = storage.order_logs(order_id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn online_sender_payment_starts_processing() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::customer());

        let mut online = action();
        online.payment_method = PaymentMethod::Online;
        let outcome = online.execute(&mut ctx, &metadata).await.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order(outcome.order_id.unwrap()).unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::ProcessingOnline);
    }

    #[tokio::test]
    async fn receiver_paying_online_stays_unpaid() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::customer());

        let mut online = action();
        online.payer = Payer::Receiver;
        online.payment_method = PaymentMethod::Online;
        let outcome = online.execute(&mut ctx, &metadata).await.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order(outcome.order_id.unwrap()).unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn notifies_customer_and_pickup_dispatchers() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::customer());

        action().execute(&mut ctx, &metadata).await.unwrap();
        let recipients: Vec<_> = ctx
            .staged_notifications()
            .iter()
            .map(|n| n.user_id.clone())
            .collect();
        assert!(recipients.contains(&"cust-1".to_string()));
        assert!(recipients.contains(&"disp-hn".to_string()));
        assert!(!recipients.contains(&"disp-hcm".to_string()));
    }

    #[tokio::test]
    async fn missing_rate_card_blocks_creation() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::customer());

        let mut unpriced = action();
        unpriced.delivery_area_id = 99;
        let err = unpriced.execute(&mut ctx, &metadata).await.unwrap_err();
        assert!(matches!(err, OrderError::MissingRateCard(99)));
    }

    #[tokio::test]
    async fn non_customers_may_not_create() {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(testutil::dispatcher_hn());

        let err = action().execute(&mut ctx, &metadata).await.unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));
    }
}
