//! Notification sink boundary
//!
//! Notifications are staged during command execution and dispatched by the
//! manager only after the transaction commits. Delivery is best effort: a
//! failing sink is logged and never affects the command result.

use shared::models::Notification;

pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Default sink: writes notifications to the log
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(
            user_id = %notification.user_id,
            order_id = ?notification.order_id,
            "notify: {}",
            notification.message
        );
        Ok(())
    }
}

/// Test sink that records everything it is handed
#[derive(Default)]
pub struct RecordingSink {
    delivered: parking_lot::Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }

    pub fn for_user(&self, user_id: &str) -> Vec<Notification> {
        self.delivered
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.delivered.lock().push(notification.clone());
        Ok(())
    }
}
