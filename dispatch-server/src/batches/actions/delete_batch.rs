//! DeleteBatch command handler
//!
//! Only a staged batch can be deleted; every member is released with its
//! status untouched.

use async_trait::async_trait;
use shared::batch::BatchStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

#[derive(Debug, Clone)]
pub struct DeleteBatchAction {
    pub batch_id: u64,
}

#[async_trait]
impl CommandHandler for DeleteBatchAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_dispatcher_or_admin(&metadata.actor)?;
        let batch = ctx.load_batch(self.batch_id)?;

        if batch.status != BatchStatus::Created {
            return Err(OrderError::IllegalTransition(format!(
                "batch {} can only be deleted while CREATED, it is {}",
                batch.batch_code, batch.status
            )));
        }

        for mut order in ctx.storage.orders_in_batch_txn(ctx.txn, batch.id)? {
            order.shipment_batch_id = None;
            ctx.store_order(&order)?;
        }
        ctx.storage.remove_batch_logs(ctx.txn, batch.id)?;
        ctx.storage.remove_batch(ctx.txn, batch.id)?;

        tracing::info!(
            batch_id = batch.id,
            batch_code = %batch.batch_code,
            deleted_by = %metadata.actor.user_id,
            "batch deleted, members released"
        );
        Ok(CommandOutcome::for_batch(batch.id))
    }
}
