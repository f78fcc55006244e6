//! Results handed back from background tasks to the view that started them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::wakeup::WakeupSender;

/// A queue shared between a view and its background tasks.
///
/// Tasks [`post`](Self::post) messages; the view drains them on its next
/// tick.
pub struct Mailbox<M> {
    queue: Arc<Mutex<VecDeque<M>>>,
    wakeup: WakeupSender,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            wakeup: self.wakeup.clone(),
        }
    }
}

impl<M> Mailbox<M> {
    pub fn new(wakeup: WakeupSender) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            wakeup,
        }
    }

    pub fn post(&self, message: M) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message);
        self.wakeup.send();
    }

    /// Take every queued message, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wakeup;

    #[tokio::test]
    async fn test_posts_wake_and_drain_in_order() {
        let (tx, mut rx) = wakeup::channel();
        let mailbox = Mailbox::new(tx);
        let sender = mailbox.clone();

        tokio::spawn(async move {
            sender.post("created");
            sender.post("refreshed");
        })
        .await
        .unwrap();

        assert_eq!(rx.recv().await, Some(()));
        assert_eq!(mailbox.drain(), vec!["created", "refreshed"]);
        assert!(mailbox.drain().is_empty());
    }
}
