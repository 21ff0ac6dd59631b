//! Command execution context and handler trait
//!
//! A [`CommandContext`] wraps the single write transaction plus the
//! reference-data directory, and stages the effects that must only leave
//! the process after commit (notifications, broadcast events). Everything
//! written through the context is atomic with the command; everything
//! staged is drained by the manager post-commit.

use async_trait::async_trait;
use redb::WriteTransaction;
use shared::batch::ShipmentBatch;
use shared::command::{CommandError, ErrorCode};
use shared::models::{Actor, Notification};
use shared::order::{Order, OrderLog, OrderStatus};
use shared::wallet::WalletTxnType;
use thiserror::Error;

use crate::directory::Directory;
use crate::manager::EngineEvent;
use crate::storage::{Storage, StorageError};
use crate::wallet;

/// Order/batch engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    OrderNotFound(u64),

    #[error("Batch {0} not found")]
    BatchNotFound(u64),

    #[error("Shipper employee {0} not found")]
    ShipperNotFound(u64),

    #[error("Customer {0} not found")]
    CustomerNotFound(u64),

    #[error("Warehouse {0} not found")]
    WarehouseNotFound(u64),

    #[error("No rate card configured for area {0}")]
    MissingRateCard(u64),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::OrderNotFound(_)
            | OrderError::BatchNotFound(_)
            | OrderError::ShipperNotFound(_)
            | OrderError::CustomerNotFound(_)
            | OrderError::WarehouseNotFound(_) => ErrorCode::NotFound,
            OrderError::MissingRateCard(_) => ErrorCode::ExternalDependency,
            OrderError::Forbidden(_) => ErrorCode::Forbidden,
            OrderError::IllegalTransition(_) => ErrorCode::IllegalTransition,
            OrderError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            OrderError::Storage(_) => ErrorCode::Internal,
        }
    }
}

impl From<OrderError> for CommandError {
    fn from(err: OrderError) -> Self {
        CommandError::new(err.code(), err.to_string())
    }
}

/// Who triggered the command and when (server clock)
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub actor: Actor,
    pub timestamp: i64,
}

/// What an accepted command reports back
#[derive(Debug, Default)]
pub struct CommandOutcome {
    pub order_id: Option<u64>,
    pub batch_id: Option<u64>,
    pub cascade: Vec<shared::batch::CascadeOutcome>,
}

impl CommandOutcome {
    pub fn for_order(order_id: u64) -> Self {
        Self {
            order_id: Some(order_id),
            ..Self::default()
        }
    }

    pub fn for_batch(batch_id: u64) -> Self {
        Self {
            batch_id: Some(batch_id),
            ..Self::default()
        }
    }
}

/// Execution context for one command
pub struct CommandContext<'a> {
    pub txn: &'a WriteTransaction,
    pub storage: &'a Storage,
    pub directory: &'a Directory,
    notifications: Vec<Notification>,
    events: Vec<EngineEvent>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a Storage, directory: &'a Directory) -> Self {
        Self {
            txn,
            storage,
            directory,
            notifications: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn load_order(&self, order_id: u64) -> Result<Order, OrderError> {
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub fn load_batch(&self, batch_id: u64) -> Result<ShipmentBatch, OrderError> {
        self.storage
            .get_batch_txn(self.txn, batch_id)?
            .ok_or(OrderError::BatchNotFound(batch_id))
    }

    pub fn store_order(&self, order: &Order) -> Result<(), OrderError> {
        Ok(self.storage.store_order(self.txn, order)?)
    }

    pub fn store_batch(&self, batch: &ShipmentBatch) -> Result<(), OrderError> {
        Ok(self.storage.store_batch(self.txn, batch)?)
    }

    /// Append an order history entry and stage it for broadcast
    pub fn log_order(
        &mut self,
        order_id: u64,
        status: OrderStatus,
        note: impl Into<String>,
        metadata: &CommandMetadata,
    ) -> Result<(), OrderError> {
        let log = OrderLog {
            order_id,
            status,
            time: metadata.timestamp,
            note: note.into(),
            updated_by: metadata.actor.user_id.clone(),
        };
        self.storage.append_order_log(self.txn, &log)?;
        self.events.push(EngineEvent::Order(log));
        Ok(())
    }

    /// Append a batch history entry and stage it for broadcast
    pub fn log_batch(
        &mut self,
        batch_id: u64,
        status: shared::batch::BatchStatus,
        note: impl Into<String>,
        metadata: &CommandMetadata,
    ) -> Result<(), OrderError> {
        let log = shared::batch::ShipmentBatchLog {
            batch_id,
            status,
            time: metadata.timestamp,
            note: note.into(),
            updated_by: metadata.actor.user_id.clone(),
        };
        self.storage.append_batch_log(self.txn, &log)?;
        self.events.push(EngineEvent::Batch(log));
        Ok(())
    }

    /// Post a signed amount to a user's wallet, atomic with the command
    pub fn post_wallet(
        &self,
        user_id: &str,
        amount: rust_decimal::Decimal,
        txn_type: WalletTxnType,
        description: impl Into<String>,
        related_order_id: Option<u64>,
        now: i64,
    ) -> Result<(), OrderError> {
        wallet::post(
            self.storage,
            self.txn,
            user_id,
            amount,
            txn_type,
            description,
            related_order_id,
            now,
        )?;
        Ok(())
    }

    // ========== Notification staging ==========

    /// Stage a notification for post-commit delivery
    pub fn notify(&mut self, user_id: impl Into<String>, message: impl Into<String>, order_id: Option<u64>) {
        self.notifications.push(Notification {
            user_id: user_id.into(),
            message: message.into(),
            order_id,
        });
    }

    /// Notify a customer by id; a missing directory entry is logged and
    /// the recipient skipped
    pub fn notify_customer(&mut self, customer_id: u64, message: impl Into<String>, order_id: Option<u64>) {
        match self.directory.customer(customer_id) {
            Some(customer) => self.notify(customer.user_id, message, order_id),
            None => tracing::warn!(customer_id, "customer missing from directory, notification skipped"),
        }
    }

    /// Notify an employee by id; a missing entry is logged and skipped
    pub fn notify_employee(&mut self, employee_id: u64, message: impl Into<String>, order_id: Option<u64>) {
        match self.directory.employee(employee_id) {
            Some(employee) => self.notify(employee.user_id, message, order_id),
            None => tracing::warn!(employee_id, "employee missing from directory, notification skipped"),
        }
    }

    /// Fan out to every dispatcher whose home area matches
    pub fn notify_dispatchers_in_area(&mut self, area_id: u64, message: &str, order_id: Option<u64>) {
        for dispatcher in self.directory.dispatchers_in_area(area_id) {
            self.notify(dispatcher.user_id, message, order_id);
        }
    }

    /// Notify the order's customer, dispatcher and shipper, minus the actor
    pub fn notify_order_stakeholders(&mut self, order: &Order, message: &str, acting: &Actor) {
        let mut recipients: Vec<String> = Vec::new();
        if let Some(customer) = self.directory.customer(order.customer_id) {
            recipients.push(customer.user_id);
        } else {
            tracing::warn!(customer_id = order.customer_id, "customer missing from directory, notification skipped");
        }
        for employee_id in [order.dispatcher_id, order.shipper_id].into_iter().flatten() {
            if let Some(employee) = self.directory.employee(employee_id) {
                recipients.push(employee.user_id);
            } else {
                tracing::warn!(employee_id, "employee missing from directory, notification skipped");
            }
        }
        recipients.sort();
        recipients.dedup();
        for user_id in recipients {
            if user_id != acting.user_id {
                self.notify(user_id, message, Some(order.id));
            }
        }
    }

    /// Drain staged post-commit effects (manager only)
    pub fn take_effects(&mut self) -> (Vec<Notification>, Vec<EngineEvent>) {
        (
            std::mem::take(&mut self.notifications),
            std::mem::take(&mut self.events),
        )
    }

    #[cfg(test)]
    pub fn staged_notifications(&self) -> &[Notification] {
        &self.notifications
    }
}

/// One command action
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError>;
}
