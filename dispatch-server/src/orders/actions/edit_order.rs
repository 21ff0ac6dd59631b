//! EditOrder command handler
//!
//! Route and parcel details may change while the order is still Pending;
//! the price is recomputed from the rate cards.

use async_trait::async_trait;
use shared::order::{OrderChanges, OrderStatus};

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
use crate::pricing;

#[derive(Debug, Clone)]
pub struct EditOrderAction {
    pub order_id: u64,
    pub changes: OrderChanges,
}

#[async_trait]
impl CommandHandler for EditOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_dispatcher_or_admin(&metadata.actor)?;
        let mut order = ctx.load_order(self.order_id)?;
        if !metadata.actor.is_admin() {
            auth::ensure_dispatcher_in_area(&metadata.actor, order.pickup_area_id)?;
        }

        if order.status != OrderStatus::Pending {
            return Err(OrderError::IllegalTransition(format!(
                "only pending orders can be edited, order is {}",
                order.status
            )));
        }

        let c = &self.changes;
        if let Some(v) = c.pickup_area_id {
            order.pickup_area_id = v;
        }
        if let Some(v) = c.delivery_area_id {
            order.delivery_area_id = v;
        }
        if let Some(v) = &c.pickup_address {
            order.pickup_address = v.clone();
        }
        if let Some(v) = &c.delivery_address {
            order.delivery_address = v.clone();
        }
        if let Some(v) = &c.receiver_name {
            order.receiver_name = v.clone();
        }
        if let Some(v) = &c.receiver_phone {
            order.receiver_phone = v.clone();
        }
        if let Some(v) = c.distance_km {
            order.distance_km = v;
        }
        if let Some(v) = c.weight_kg {
            order.weight_kg = v;
        }

        let pickup_rate = ctx
            .directory
            .rate_card(order.pickup_area_id)
            .ok_or(OrderError::MissingRateCard(order.pickup_area_id))?;
        let delivery_rate = ctx
            .directory
            .rate_card(order.delivery_area_id)
            .ok_or(OrderError::MissingRateCard(order.delivery_area_id))?;
        order.total_price =
            pricing::price_for(&pickup_rate, &delivery_rate, order.distance_km, order.weight_kg);

        ctx.store_order(&order)?;
        ctx.log_order(order.id, order.status, "order details edited", metadata)?;
        ctx.notify_customer(
            order.customer_id,
            format!("Order {} was updated", order.tracking_code),
            Some(order.id),
        );

        Ok(CommandOutcome::for_order(order.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testutil;
    use rust_decimal::Decimal;

    async fn edit(
        order: shared::order::Order,
        actor: shared::models::Actor,
        changes: OrderChanges,
    ) -> (Storage, Result<CommandOutcome, OrderError>) {
        let storage = Storage::open_in_memory().unwrap();
        let directory = testutil::directory();
        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &directory);
        let metadata = testutil::metadata(actor);
        let result = EditOrderAction {
            order_id: order.id,
            changes,
        }
        .execute(&mut ctx, &metadata)
        .await;
        drop(ctx);
        txn.commit().unwrap();
        (storage, result)
    }

    #[tokio::test]
    async fn edits_reprice_the_order() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let changes = OrderChanges {
            distance_km: Some(Decimal::from(20)),
            receiver_name: Some("New Receiver".into()),
            ..OrderChanges::default()
        };
        let (storage, result) = edit(order, testutil::dispatcher_hn(), changes).await;
        result.unwrap();

        let stored = storage.get_order(1).unwrap().unwrap();
        assert_eq!(stored.receiver_name, "New Receiver");
        // base 30 + 20km * 4 + 2kg * 6
        assert_eq!(stored.total_price, Decimal::from(122));
    }

    #[tokio::test]
    async fn non_pending_orders_are_immutable() {
        let order = testutil::sample_order(1, OrderStatus::Picking);
        let (_, result) = edit(
            order,
            testutil::dispatcher_hn(),
            OrderChanges::default(),
        )
        .await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn customers_may_not_edit() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let (_, result) = edit(order, testutil::customer(), OrderChanges::default()).await;
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
    }

    #[tokio::test]
    async fn rerouting_to_an_unpriced_area_fails() {
        let order = testutil::sample_order(1, OrderStatus::Pending);
        let changes = OrderChanges {
            delivery_area_id: Some(77),
            ..OrderChanges::default()
        };
        let (storage, result) = edit(order, testutil::admin(), changes).await;
        assert!(matches!(result, Err(OrderError::MissingRateCard(77))));
        // Rejected edits leave the order untouched
        assert_eq!(
            storage.get_order(1).unwrap().unwrap().delivery_area_id,
            testutil::AREA_HCM
        );
    }
}
