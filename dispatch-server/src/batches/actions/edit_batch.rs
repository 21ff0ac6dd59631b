//! EditBatch command handler

use async_trait::async_trait;
use shared::batch::BatchStatus;

use crate::auth;
use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

/// Change destination and/or linehaul shipper while still staging
#[derive(Debug, Clone)]
pub struct EditBatchAction {
    pub batch_id: u64,
    pub destination_warehouse_id: Option<u64>,
    pub shipper_id: Option<u64>,
}

#[async_trait]
impl CommandHandler for EditBatchAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        auth::ensure_dispatcher_or_admin(&metadata.actor)?;
        let mut batch = ctx.load_batch(self.batch_id)?;

        if batch.status != BatchStatus::Created {
            return Err(OrderError::IllegalTransition(format!(
                "batch {} can only be edited while CREATED, it is {}",
                batch.batch_code, batch.status
            )));
        }

        if let Some(warehouse_id) = self.destination_warehouse_id {
            ctx.directory
                .warehouse(warehouse_id)
                .ok_or(OrderError::WarehouseNotFound(warehouse_id))?;
            batch.destination_warehouse_id = warehouse_id;
        }
        if let Some(shipper_id) = self.shipper_id {
            ctx.directory
                .shipper(shipper_id)
                .ok_or(OrderError::ShipperNotFound(shipper_id))?;
            batch.shipper_id = Some(shipper_id);
        }

        ctx.store_batch(&batch)?;
        ctx.log_batch(batch.id, batch.status, "batch details edited", metadata)?;
        Ok(CommandOutcome::for_batch(batch.id))
    }
}
