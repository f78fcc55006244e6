//! Process-wide toast notifications.
//!
//! Any task can publish a toast through [`Toaster::global`]; the event loop
//! subscribes and redraws whenever the queue changes. Toasts expire after
//! [`DEFAULT_TOAST_DURATION`] unless dismissed earlier.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Default duration for toast notifications.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A published toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub created: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= self.duration
    }

    pub fn expires_at(&self) -> Instant {
        self.created + self.duration
    }
}

/// Publish/subscribe registry for toasts.
#[derive(Debug)]
pub struct Toaster {
    queue: watch::Sender<Vec<Toast>>,
    next_id: AtomicU64,
}

static GLOBAL: OnceLock<Toaster> = OnceLock::new();

impl Toaster {
    pub fn new() -> Self {
        let (queue, _) = watch::channel(Vec::new());
        Self {
            queue,
            next_id: AtomicU64::new(1),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Toaster {
        GLOBAL.get_or_init(Toaster::new)
    }

    /// Queue a toast with the default duration; returns its id.
    pub fn publish(&self, message: impl Into<String>, level: ToastLevel) -> u64 {
        self.publish_for(message, level, DEFAULT_TOAST_DURATION)
    }

    pub fn publish_for(&self, message: impl Into<String>, level: ToastLevel, duration: Duration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            level,
            created: Instant::now(),
            duration,
        };
        log::debug!("toast #{} ({:?}): {}", id, level, toast.message);
        self.queue.send_modify(|queue| queue.push(toast));
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.publish(message, ToastLevel::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.publish(message, ToastLevel::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.publish(message, ToastLevel::Error)
    }

    /// Remove a toast early. Returns whether it was still queued.
    pub fn dismiss(&self, id: u64) -> bool {
        self.queue.send_if_modified(|queue| {
            let before = queue.len();
            queue.retain(|t| t.id != id);
            queue.len() != before
        })
    }

    /// Drop expired toasts. Returns whether anything was removed.
    pub fn prune(&self, now: Instant) -> bool {
        self.queue.send_if_modified(|queue| {
            let before = queue.len();
            queue.retain(|t| !t.is_expired(now));
            queue.len() != before
        })
    }

    /// Current queue, oldest first.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.queue.borrow().clone()
    }

    /// Receiver that observes every change to the queue.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.queue.subscribe()
    }

    /// Earliest expiry among queued toasts.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.queue.borrow().iter().map(Toast::expires_at).min()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_dismiss() {
        let toaster = Toaster::new();
        let first = toaster.success("Alias created successfully!");
        let second = toaster.error("Failed to add alias.");

        let queue = toaster.snapshot();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].level, ToastLevel::Success);
        assert_eq!(queue[1].message, "Failed to add alias.");

        assert!(toaster.dismiss(first));
        assert!(!toaster.dismiss(first));
        assert_eq!(toaster.snapshot()[0].id, second);
    }

    #[test]
    fn test_prune_removes_expired() {
        let toaster = Toaster::new();
        toaster.publish_for("short", ToastLevel::Info, Duration::from_millis(10));
        toaster.info("long");

        let created = toaster.snapshot()[0].created;
        assert!(!toaster.prune(created));
        assert!(toaster.prune(created + Duration::from_secs(1)));
        assert_eq!(toaster.snapshot().len(), 1);
        assert!(toaster.prune(created + DEFAULT_TOAST_DURATION + Duration::from_secs(1)));
        assert!(toaster.snapshot().is_empty());
        assert_eq!(toaster.next_expiry(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let toaster = Toaster::new();
        let mut rx = toaster.subscribe();

        toaster.info("Marked as reviewed.");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        // Dismissing an unknown id does not notify.
        toaster.dismiss(999);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_global_is_shared() {
        let a = Toaster::global() as *const Toaster;
        let b = Toaster::global() as *const Toaster;
        assert_eq!(a, b);
    }
}
