//! Transient Notifications
//!
//! A notification enters, stays visible, exits and is removed, each step
//! driven by a timer on the tokio runtime. Whether a new notification
//! replaces visible ones or stacks under them is configured per page.

use chrono::{DateTime, Utc};
use maud::{html, Markup};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use crate::config::{NotificationConfig, StackPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
            NotificationKind::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Entering,
    Visible,
    Exiting,
}

impl NotificationPhase {
    fn as_str(&self) -> &'static str {
        match self {
            NotificationPhase::Entering => "entering",
            NotificationPhase::Visible => "visible",
            NotificationPhase::Exiting => "exiting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub phase: NotificationPhase,
    pub shown_at: DateTime<Utc>,
}

type Entries = Arc<Mutex<Vec<Notification>>>;

/// Notification area of one page
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    entries: Entries,
    config: NotificationConfig,
}

impl NotificationCenter {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            config,
        }
    }

    /// Show a notification and schedule its dismissal
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            phase: NotificationPhase::Entering,
            shown_at: Utc::now(),
        };
        let id = notification.id;

        tracing::debug!(kind = kind.as_str(), message = %notification.message, "Showing notification");

        {
            let mut entries = self.entries.lock();
            if self.config.policy == StackPolicy::Replace {
                entries.clear();
            }
            entries.push(notification);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_lifecycle(
                    self.entries.clone(),
                    id,
                    Duration::from_millis(self.config.transition_ms),
                    Duration::from_millis(self.config.dismiss_after_ms),
                ));
            }
            Err(_) => {
                tracing::warn!(%id, "No async runtime, notification will not auto-dismiss");
            }
        }

        id
    }

    /// Remove a notification immediately (close button)
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn active(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.entries.lock().last().cloned()
    }

    pub fn render(&self) -> Markup {
        let entries = self.active();
        html! {
            div.notifications {
                @for n in &entries {
                    div class={ "notification notification-" (n.kind.as_str()) } data-phase=(n.phase.as_str()) data-id=(n.id.to_string()) {
                        span.notification-icon { (n.kind.icon()) }
                        span.notification-message { (n.message) }
                    }
                }
            }
        }
    }
}

async fn run_lifecycle(entries: Entries, id: Uuid, transition: Duration, dismiss_after: Duration) {
    let start = Instant::now();

    sleep_until(start + transition).await;
    if !set_phase(&entries, id, NotificationPhase::Visible) {
        return;
    }

    sleep_until(start + dismiss_after.max(transition)).await;
    if !set_phase(&entries, id, NotificationPhase::Exiting) {
        return;
    }

    sleep_until(start + dismiss_after.max(transition) + transition).await;
    entries.lock().retain(|n| n.id != id);
}

/// False once the notification is gone (replaced or dismissed)
fn set_phase(entries: &Entries, id: Uuid, phase: NotificationPhase) -> bool {
    match entries.lock().iter_mut().find(|n| n.id == id) {
        Some(n) => {
            n.phase = phase;
            true
        }
        None => false,
    }
}
