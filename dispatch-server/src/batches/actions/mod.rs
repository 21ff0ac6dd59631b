//! Batch command actions

use async_trait::async_trait;
use shared::command::CommandPayload;

use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

mod add_orders;
mod complete_transport;
mod create_batch;
mod delete_batch;
mod edit_batch;
mod start_transport;

pub use add_orders::AddOrdersToBatchAction;
pub use complete_transport::CompleteTransportAction;
pub use create_batch::CreateBatchAction;
pub use delete_batch::DeleteBatchAction;
pub use edit_batch::EditBatchAction;
pub use start_transport::StartTransportAction;

/// Dispatches to the concrete batch action implementations
pub enum BatchAction {
    Create(CreateBatchAction),
    AddOrders(AddOrdersToBatchAction),
    StartTransport(StartTransportAction),
    CompleteTransport(CompleteTransportAction),
    Edit(EditBatchAction),
    Delete(DeleteBatchAction),
}

impl BatchAction {
    /// The only place that matches batch-level command payloads
    pub fn from_payload(payload: &CommandPayload) -> Option<Self> {
        Some(match payload {
            CommandPayload::CreateBatch {
                order_ids,
                destination_warehouse_id,
                shipper_id,
            } => BatchAction::Create(CreateBatchAction {
                order_ids: order_ids.clone(),
                destination_warehouse_id: *destination_warehouse_id,
                shipper_id: *shipper_id,
            }),
            CommandPayload::AddOrdersToBatch { batch_id, order_ids } => {
                BatchAction::AddOrders(AddOrdersToBatchAction {
                    batch_id: *batch_id,
                    order_ids: order_ids.clone(),
                })
            }
            CommandPayload::StartTransport { batch_id } => {
                BatchAction::StartTransport(StartTransportAction { batch_id: *batch_id })
            }
            CommandPayload::CompleteTransport { batch_id } => {
                BatchAction::CompleteTransport(CompleteTransportAction { batch_id: *batch_id })
            }
            CommandPayload::EditBatch {
                batch_id,
                destination_warehouse_id,
                shipper_id,
            } => BatchAction::Edit(EditBatchAction {
                batch_id: *batch_id,
                destination_warehouse_id: *destination_warehouse_id,
                shipper_id: *shipper_id,
            }),
            CommandPayload::DeleteBatch { batch_id } => {
                BatchAction::Delete(DeleteBatchAction { batch_id: *batch_id })
            }
            _ => return None,
        })
    }
}

#[async_trait]
impl CommandHandler for BatchAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        match self {
            BatchAction::Create(action) => action.execute(ctx, metadata).await,
            BatchAction::AddOrders(action) => action.execute(ctx, metadata).await,
            BatchAction::StartTransport(action) => action.execute(ctx, metadata).await,
            BatchAction::CompleteTransport(action) => action.execute(ctx, metadata).await,
            BatchAction::Edit(action) => action.execute(ctx, metadata).await,
            BatchAction::Delete(action) => action.execute(ctx, metadata).await,
        }
    }
}
