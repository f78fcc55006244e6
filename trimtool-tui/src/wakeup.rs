//! Wakeup channel for passive rendering.
//!
//! The event loop sleeps while nothing happens. Request controllers and
//! background tasks hold a [`WakeupSender`] and signal it after mutating
//! shared state so the next frame picks the change up.

use tokio::sync::mpsc;

/// Sender half of the wakeup channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Send a wakeup signal.
    ///
    /// Never blocks. A full buffer already guarantees a pending render and a
    /// closed receiver means the loop is shutting down, so errors are ignored.
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wakeup channel.
#[derive(Debug)]
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Wait for a wakeup signal.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Discard queued signals; they collapse into the render already due.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create a new wakeup channel pair.
pub fn channel() -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(16);
    (WakeupSender { tx }, WakeupReceiver { rx })
}
