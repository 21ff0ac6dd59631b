//! Dispatch engine manager
//!
//! Owns the storage handle and processes commands one write transaction
//! at a time. The transaction is the linearization point: every handler
//! re-reads its entities inside the transaction, so two racing commands
//! serialize and the loser fails its own validation instead of clobbering
//! state. Post-commit effects (notifications, event broadcast) never fire
//! for a rejected command.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared::batch::{ShipmentBatch, ShipmentBatchLog};
use shared::command::{Command, CommandError, CommandPayload, CommandResponse, ErrorCode};
use shared::models::{Actor, Role};
use shared::order::{Order, OrderLog};
use shared::wallet::{Wallet, WalletTransaction};
use tokio::sync::broadcast;

use crate::batches::BatchAction;
use crate::directory::Directory;
use crate::gateway::{GatewayConfig, PaymentGateway};
use crate::notify::NotificationSink;
use crate::orders::actions::OrderAction;
use crate::orders::{CommandContext, CommandHandler, CommandMetadata};
use crate::storage::{Storage, StorageResult};


/// History entry produced by a committed command, fanned out to
/// subscribers (live order tracking screens)
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    Order(OrderLog),
    Batch(ShipmentBatchLog),
}

pub struct DispatchManager {
    storage: Storage,
    directory: Arc<Directory>,
    gateway: PaymentGateway,
    sink: Arc<dyn NotificationSink>,
    events_tx: broadcast::Sender<EngineEvent>,
}

impl DispatchManager {
    pub fn new(
        storage: Storage,
        directory: Arc<Directory>,
        gateway_config: GatewayConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            storage,
            directory,
            gateway: PaymentGateway::new(gateway_config),
            sink,
            events_tx,
        }
    }

    /// Subscribe to history entries of committed commands
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }

    /// Validate and apply one command atomically.
    ///
    /// The client timestamp on the command is kept for audit only; log
    /// entries carry the server clock.
    pub async fn process_command(&self, command: Command) -> CommandResponse {
        let metadata = CommandMetadata {
            actor: command.actor,
            timestamp: shared::util::now_millis(),
        };

        let txn = match self.storage.begin_write() {
            Ok(txn) => txn,
            Err(err) => {
                tracing::error!(error = %err, "could not open write transaction");
                return CommandResponse::error(CommandError::new(
                    ErrorCode::Internal,
                    err.to_string(),
                ));
            }
        };

        let mut ctx = CommandContext::new(&txn, &self.storage, &self.directory);
        let result = if let Some(action) = OrderAction::from_payload(&command.payload) {
            action.execute(&mut ctx, &metadata).await
        } else if let Some(action) = BatchAction::from_payload(&command.payload) {
            action.execute(&mut ctx, &metadata).await
        } else {
            // Both dispatchers cover the whole payload enum
            tracing::error!(payload = ?command.payload, "unroutable command payload");
            return CommandResponse::error(CommandError::new(
                ErrorCode::Internal,
                "unroutable command payload",
            ));
        };

        match result {
            Ok(outcome) => {
                let (notifications, events) = ctx.take_effects();
                drop(ctx);
                if let Err(err) = txn.commit() {
                    tracing::error!(error = %err, "commit failed");
                    return CommandResponse::error(CommandError::new(
                        ErrorCode::Internal,
                        err.to_string(),
                    ));
                }

                for event in events {
                    // No subscribers is fine
                    let _ = self.events_tx.send(event);
                }
                for notification in notifications {
                    if let Err(err) = self.sink.deliver(&notification) {
                        tracing::warn!(
                            user_id = %notification.user_id,
                            error = %err,
                            "notification delivery failed"
                        );
                    }
                }

                CommandResponse {
                    success: true,
                    order_id: outcome.order_id,
                    batch_id: outcome.batch_id,
                    cascade: outcome.cascade,
                    error: None,
                }
            }
            Err(err) => {
                drop(ctx);
                tracing::debug!(
                    actor = %metadata.actor.user_id,
                    error = %err,
                    "command rejected"
                );
                CommandResponse::error(err.into())
            }
        }
    }

    // ========== Online payment ==========

    /// Signed gateway redirect URL for an order's shipping fee
    pub fn payment_redirect(&self, order_id: u64) -> Result<String, CommandError> {
        let order = self
            .storage
            .get_order(order_id)
            .map_err(|err| CommandError::new(ErrorCode::Internal, err.to_string()))?
            .ok_or_else(|| {
                CommandError::new(ErrorCode::NotFound, format!("Order {order_id} not found"))
            })?;
        Ok(self.gateway.build_payment_redirect(&order))
    }

    /// Verify a gateway callback and, on success, confirm the payment.
    ///
    /// The confirmation runs as a synthetic gateway principal so the
    /// audit trail shows who really flipped the payment status.
    pub async fn verify_and_confirm_payment(
        &self,
        params: &BTreeMap<String, String>,
    ) -> CommandResponse {
        let verdict = self.gateway.verify_callback(params);
        if !verdict.signature_valid {
            tracing::warn!("gateway callback with invalid signature");
            return CommandResponse::error(CommandError::new(
                ErrorCode::Forbidden,
                "invalid gateway signature",
            ));
        }
        if !verdict.success {
            return CommandResponse::error(CommandError::new(
                ErrorCode::ExternalDependency,
                "gateway reported payment failure",
            ));
        }
        let Some(order_id) = verdict.order_id else {
            return CommandResponse::error(CommandError::new(
                ErrorCode::NotFound,
                "callback carries no order reference",
            ));
        };

        self.process_command(Command {
            actor: gateway_actor(),
            timestamp: shared::util::now_millis(),
            payload: CommandPayload::ConfirmOnlinePayment {
                order_id,
                transaction_id: verdict.transaction_id,
            },
        })
        .await
    }

    // ========== Read side ==========

    pub fn order(&self, order_id: u64) -> StorageResult<Option<Order>> {
        self.storage.get_order(order_id)
    }

    pub fn order_by_tracking_code(&self, code: &str) -> StorageResult<Option<Order>> {
        self.storage.find_order_by_tracking_code(code)
    }

    pub fn order_logs(&self, order_id: u64) -> StorageResult<Vec<OrderLog>> {
        self.storage.order_logs(order_id)
    }

    pub fn batch(&self, batch_id: u64) -> StorageResult<Option<ShipmentBatch>> {
        self.storage.get_batch(batch_id)
    }

    pub fn batch_logs(&self, batch_id: u64) -> StorageResult<Vec<ShipmentBatchLog>> {
        self.storage.batch_logs(batch_id)
    }

    pub fn orders_in_batch(&self, batch_id: u64) -> StorageResult<Vec<Order>> {
        self.storage.orders_in_batch(batch_id)
    }

    pub fn wallet(&self, user_id: &str) -> StorageResult<Option<Wallet>> {
        self.storage.get_wallet(user_id)
    }

    pub fn wallet_transactions(&self, user_id: &str) -> StorageResult<Vec<WalletTransaction>> {
        self.storage.wallet_transactions(user_id)
    }
}

/// Principal attributed to verified gateway callbacks
fn gateway_actor() -> Actor {
    Actor {
        user_id: "payment-gateway".into(),
        display_name: "Payment Gateway".into(),
        role: Role::Admin,
        employee_id: None,
        area_id: None,
        customer_id: None,
    }
}
