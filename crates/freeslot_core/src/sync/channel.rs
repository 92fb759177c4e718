//! Push transport contract and in-process implementation.

use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

/// Push-capable transport for change notifications.
///
/// Delivery order is preserved per publisher call sequence within a scope.
/// No batching or coalescing is promised.
pub trait SyncChannel<T>: Send + Sync {
    /// Sends `notification` to every live subscriber of `scope`.
    fn publish(&self, scope: &str, notification: T);

    /// Opens a new subscription to `scope`.
    fn subscribe(&self, scope: &str) -> Subscription<T>;
}

/// Live stream of notifications for one scope.
///
/// Dropping the subscription stops delivery; nothing else is affected. Once
/// every transport-side sender is gone and the queue is empty, the receive
/// methods return `None`.
pub struct Subscription<T> {
    scope: String,
    snapshot: RefCell<VecDeque<T>>,
    receiver: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Creates a connected subscription and the sender that feeds it.
    pub fn channel(scope: impl Into<String>) -> (Sender<T>, Self) {
        let (sender, receiver) = mpsc::channel();
        let subscription = Self {
            scope: scope.into(),
            snapshot: RefCell::new(VecDeque::new()),
            receiver,
        };
        (sender, subscription)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Queues notifications for this subscriber only.
    ///
    /// Seeded items are delivered before anything the transport has queued.
    pub fn seed(&self, notifications: impl IntoIterator<Item = T>) {
        self.snapshot.borrow_mut().extend(notifications);
    }

    /// Blocks until the next notification, or `None` once the transport is gone.
    pub fn recv(&self) -> Option<T> {
        self.next_seeded().or_else(|| self.receiver.recv().ok())
    }

    pub fn try_recv(&self) -> Option<T> {
        if let Some(notification) = self.next_seeded() {
            return Some(notification);
        }
        match self.receiver.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        if let Some(notification) = self.next_seeded() {
            return Some(notification);
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(notification) => Some(notification),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns every notification already queued, without blocking.
    pub fn drain(&self) -> Vec<T> {
        let mut pending: Vec<T> = self.snapshot.borrow_mut().drain(..).collect();
        pending.extend(self.receiver.try_iter());
        pending
    }

    fn next_seeded(&self) -> Option<T> {
        self.snapshot.borrow_mut().pop_front()
    }
}

/// Fan-out channel living in the current process.
pub struct InProcessSyncChannel<T> {
    subscribers: Mutex<HashMap<String, Vec<Sender<T>>>>,
}

impl<T> Default for InProcessSyncChannel<T> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> InProcessSyncChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribers still connected to `scope`.
    pub fn subscriber_count(&self, scope: &str) -> usize {
        let subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.get(scope).map_or(0, Vec::len)
    }
}

impl<T: Clone + Send> SyncChannel<T> for InProcessSyncChannel<T> {
    fn publish(&self, scope: &str, notification: T) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(senders) = subscribers.get_mut(scope) else {
            return;
        };

        let before = senders.len();
        senders.retain(|sender| sender.send(notification.clone()).is_ok());
        let dropped = before - senders.len();
        if dropped > 0 {
            debug!("event=sync_prune module=sync status=ok dropped={dropped}");
        }
        if senders.is_empty() {
            subscribers.remove(scope);
        }
    }

    fn subscribe(&self, scope: &str) -> Subscription<T> {
        let (sender, subscription) = Subscription::channel(scope);
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers
            .entry(scope.to_string())
            .or_default()
            .push(sender);
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::{InProcessSyncChannel, SyncChannel};
    use std::time::Duration;

    #[test]
    fn delivers_only_to_matching_scope_in_publish_order() {
        let channel = InProcessSyncChannel::<u32>::new();
        let first = channel.subscribe("a");
        let other = channel.subscribe("b");

        channel.publish("a", 1);
        channel.publish("a", 2);
        channel.publish("b", 9);

        assert_eq!(first.drain(), vec![1, 2]);
        assert_eq!(other.drain(), vec![9]);
    }

    #[test]
    fn dropping_subscription_stops_delivery_and_prunes() {
        let channel = InProcessSyncChannel::<u32>::new();
        let kept = channel.subscribe("a");
        let dropped = channel.subscribe("a");
        assert_eq!(channel.subscriber_count("a"), 2);

        drop(dropped);
        channel.publish("a", 7);

        assert_eq!(channel.subscriber_count("a"), 1);
        assert_eq!(kept.try_recv(), Some(7));
        assert_eq!(kept.try_recv(), None);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let channel = InProcessSyncChannel::<u32>::new();
        channel.publish("nobody", 1);
        assert_eq!(channel.subscriber_count("nobody"), 0);
    }

    #[test]
    fn seeded_items_precede_later_publishes() {
        let channel = InProcessSyncChannel::<u32>::new();
        let subscription = channel.subscribe("a");
        subscription.seed([10, 11]);
        channel.publish("a", 12);
        assert_eq!(subscription.drain(), vec![10, 11, 12]);
        assert_eq!(subscription.scope(), "a");
    }

    #[test]
    fn recv_ends_once_the_channel_is_dropped() {
        let channel = InProcessSyncChannel::<u32>::new();
        let subscription = channel.subscribe("a");
        subscription.seed([1]);
        channel.publish("a", 2);
        drop(channel);

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let mut received = Vec::new();
            while let Some(value) = subscription.recv() {
                received.push(value);
            }
            let _ = done_tx.send(received);
        });

        let received = done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("recv should return None after the channel is dropped");
        assert_eq!(received, vec![1, 2]);
    }

    #[test]
    fn try_recv_and_timeout_report_none_after_disconnect() {
        let channel = InProcessSyncChannel::<u32>::new();
        let subscription = channel.subscribe("a");
        drop(channel);

        assert_eq!(subscription.try_recv(), None);
        assert_eq!(subscription.recv_timeout(Duration::from_millis(10)), None);
    }
}
