use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::RwLock;
use tracing::{debug, info};

/// A user-facing message about a camera move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short heading, e.g. `Camera 192.168.0.10`.
    pub title: String,
    /// Body text.
    pub text: String,
}

/// Surface that shows notifications to the user.
pub trait Notifier: Send + Sync {
    /// Show `message` under `title`. Must not block.
    fn notify(&self, message: &str, title: &str);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str, _title: &str) {}
}

/// Forwards notifications into a channel; drops them when the channel is full.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Sender<Notification>,
}

impl ChannelNotifier {
    /// Forward into `tx`.
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, title: &str) {
        let n = Notification {
            title: title.to_string(),
            text: message.to_string(),
        };
        match self.tx.try_send(n) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("notification_dropped_full"),
            Err(TrySendError::Disconnected(_)) => debug!("notification_dropped_closed"),
        }
    }
}

/// Logs every notification and hands it to the current [`Notifier`].
pub struct NotificationDispatcher {
    notifier: RwLock<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    /// Dispatch to `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: RwLock::new(notifier),
        }
    }

    /// Replace the downstream notifier.
    pub fn set_notifier(&self, notifier: Arc<dyn Notifier>) {
        *self.notifier.write() = notifier;
    }

    /// Show a notification.
    pub fn send(&self, title: &str, text: &str) {
        info!(title, text, "notification_display");
        let notifier = self.notifier.read().clone();
        notifier.notify(text, title);
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn forwards_to_replaced_notifier() {
        let dispatcher = NotificationDispatcher::new(Arc::new(NoopNotifier));
        let (tx, rx) = bounded(4);
        dispatcher.set_notifier(Arc::new(ChannelNotifier::new(tx)));
        dispatcher.send("Camera 10.0.0.1", "Camera moved to preset №2");
        let n = rx.try_recv().expect("notification");
        assert_eq!(n.title, "Camera 10.0.0.1");
        assert_eq!(n.text, "Camera moved to preset №2");
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (tx, rx) = bounded(1);
        let notifier = ChannelNotifier::new(tx);
        notifier.notify("one", "t");
        notifier.notify("two", "t");
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().expect("first").text, "one");
    }
}
