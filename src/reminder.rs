//! Reminder scheduling: fire a callback for a medication at a point in
//! time, with a handle to cancel delivery.
//!
//! Delivery itself (system notification, alert) stays with the caller;
//! this module only owns the timing.

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Cancel token for a scheduled reminder.
pub struct ReminderHandle {
    medication_id: Uuid,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    pub fn medication_id(&self) -> Uuid {
        self.medication_id
    }

    /// Stop the reminder from firing. A no-op once it has fired.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Schedule `notify(medication_id)` at `fire_at`. A fire time in the past
/// fires immediately.
pub fn schedule<F>(fire_at: DateTime<Utc>, medication_id: Uuid, notify: F) -> ReminderHandle
where
    F: FnOnce(Uuid) + Send + 'static,
{
    let delay = (fire_at - Utc::now())
        .to_std()
        .unwrap_or(std::time::Duration::ZERO);
    tracing::debug!(%medication_id, %fire_at, "reminder scheduled");

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tracing::info!(%medication_id, "reminder fired");
        notify(medication_id);
    });

    ReminderHandle {
        medication_id,
        task,
    }
}
