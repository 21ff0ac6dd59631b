//! Order command actions
//!
//! Each action implements [`CommandHandler`] for one order-level command.

use async_trait::async_trait;
use shared::command::CommandPayload;

use crate::orders::context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};

mod assign_shipper;
mod cancel_order;
mod confirm_cod;
mod confirm_online_payment;
mod create_order;
mod delete_order;
mod edit_order;
mod mark_as_paid;
mod start_transfer;
mod update_status;

pub use assign_shipper::AssignShipperAction;
pub use cancel_order::CancelOrderAction;
pub use confirm_cod::ConfirmCodCollectionAction;
pub use confirm_online_payment::ConfirmOnlinePaymentAction;
pub use create_order::CreateOrderAction;
pub use delete_order::DeleteOrderAction;
pub use edit_order::EditOrderAction;
pub use mark_as_paid::MarkAsPaidAction;
pub use start_transfer::StartTransferAction;
pub use update_status::UpdateOrderStatusAction;

/// Dispatches to the concrete order action implementations
pub enum OrderAction {
    Create(CreateOrderAction),
    Assign(AssignShipperAction),
    UpdateStatus(UpdateOrderStatusAction),
    ConfirmCod(ConfirmCodCollectionAction),
    MarkAsPaid(MarkAsPaidAction),
    Cancel(CancelOrderAction),
    StartTransfer(StartTransferAction),
    ConfirmOnlinePayment(ConfirmOnlinePaymentAction),
    Edit(EditOrderAction),
    Delete(DeleteOrderAction),
}

impl OrderAction {
    /// The only place that matches order-level command payloads
    pub fn from_payload(payload: &CommandPayload) -> Option<Self> {
        Some(match payload {
            CommandPayload::CreateOrder {
                pickup_area_id,
                delivery_area_id,
                pickup_address,
                delivery_address,
                receiver_name,
                receiver_phone,
                distance_km,
                weight_kg,
                payer,
                payment_method,
            } => OrderAction::Create(CreateOrderAction {
                pickup_area_id: *pickup_area_id,
                delivery_area_id: *delivery_area_id,
                pickup_address: pickup_address.clone(),
                delivery_address: delivery_address.clone(),
                receiver_name: receiver_name.clone(),
                receiver_phone: receiver_phone.clone(),
                distance_km: *distance_km,
                weight_kg: *weight_kg,
                payer: *payer,
                payment_method: *payment_method,
            }),
            CommandPayload::AssignShipper {
                order_id,
                shipper_id,
                warehouse_id,
            } => OrderAction::Assign(AssignShipperAction {
                order_id: *order_id,
                shipper_id: *shipper_id,
                warehouse_id: *warehouse_id,
            }),
            CommandPayload::UpdateOrderStatus { order_id, status } => {
                OrderAction::UpdateStatus(UpdateOrderStatusAction {
                    order_id: *order_id,
                    status: *status,
                })
            }
            CommandPayload::ConfirmCodCollection { order_id } => {
                OrderAction::ConfirmCod(ConfirmCodCollectionAction { order_id: *order_id })
            }
            CommandPayload::MarkAsPaid { order_id } => {
                OrderAction::MarkAsPaid(MarkAsPaidAction { order_id: *order_id })
            }
            CommandPayload::CancelOrder { order_id } => {
                OrderAction::Cancel(CancelOrderAction { order_id: *order_id })
            }
            CommandPayload::StartTransfer {
                order_id,
                delivery_warehouse_id,
            } => OrderAction::StartTransfer(StartTransferAction {
                order_id: *order_id,
                delivery_warehouse_id: *delivery_warehouse_id,
            }),
            CommandPayload::ConfirmOnlinePayment {
                order_id,
                transaction_id,
            } => OrderAction::ConfirmOnlinePayment(ConfirmOnlinePaymentAction {
                order_id: *order_id,
                transaction_id: transaction_id.clone(),
            }),
            CommandPayload::EditOrder { order_id, changes } => OrderAction::Edit(EditOrderAction {
                order_id: *order_id,
                changes: changes.clone(),
            }),
            CommandPayload::DeleteOrder { order_id } => {
                OrderAction::Delete(DeleteOrderAction { order_id: *order_id })
            }
            _ => return None,
        })
    }
}

#[async_trait]
impl CommandHandler for OrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        match self {
            OrderAction::Create(action) => action.execute(ctx, metadata).await,
            OrderAction::Assign(action) => action.execute(ctx, metadata).await,
            OrderAction::UpdateStatus(action) => action.execute(ctx, metadata).await,
            OrderAction::ConfirmCod(action) => action.execute(ctx, metadata).await,
            OrderAction::MarkAsPaid(action) => action.execute(ctx, metadata).await,
            OrderAction::Cancel(action) => action.execute(ctx, metadata).await,
            OrderAction::StartTransfer(action) => action.execute(ctx, metadata).await,
            OrderAction::ConfirmOnlinePayment(action) => action.execute(ctx, metadata).await,
            OrderAction::Edit(action) => action.execute(ctx, metadata).await,
            OrderAction::Delete(action) => action.execute(ctx, metadata).await,
        }
    }
}
