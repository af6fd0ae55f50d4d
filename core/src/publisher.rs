//! Payload-free change notification.

use crossbeam::channel::{self, Receiver};
use core::fmt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use uuid::Uuid;

type Callback = dyn Fn() + Send + Sync;

/// A unique identifier for a subscription.
///
/// (this is just a UUID, like view IDs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32, u16, u16, [u8; 8]);

impl SubscriptionId {
    pub(crate) fn new() -> SubscriptionId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        SubscriptionId(a, b, c, *d)
    }
}

struct Subscriber {
    id: SubscriptionId,
    callback: Weak<Callback>,
}

type SubscriberList = Mutex<Vec<Subscriber>>;

/// A fan-out notification channel.
///
/// Cloning a publisher yields a handle to the same subscriber list. Subscribers are held weakly;
/// the [`Subscription`] returned by [`Publisher::subscribe`] owns the callback.
#[derive(Clone, Default)]
pub struct Publisher {
    subscribers: Arc<SubscriberList>,
}

impl Publisher {
    pub fn new() -> Publisher {
        Publisher::default()
    }

    /// Registers a callback. It will be called on every [`send`](Publisher::send) until the
    /// returned subscription is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let callback: Arc<Callback> = Arc::new(callback);
        self.subscribers.lock().push(Subscriber {
            id,
            callback: Arc::downgrade(&callback),
        });

        Subscription {
            id,
            publisher: Arc::downgrade(&self.subscribers),
            _callback: callback,
        }
    }

    /// Subscribes with a channel instead of a callback.
    ///
    /// Every notification pushes one `()` into the receiver. The channel is unbounded, so a host
    /// that polls rarely will see every tick it missed.
    #[must_use = "dropping the subscription disconnects the receiver"]
    pub fn channel(&self) -> (Subscription, Receiver<()>) {
        let (sender, receiver) = channel::unbounded();
        let subscription = self.subscribe(move || {
            if sender.send(()).is_err() {
                tracing::trace!("change receiver dropped; tick discarded");
            }
        });
        (subscription, receiver)
    }

    /// Notifies every live subscriber, in registration order.
    ///
    /// The subscriber list is not locked while callbacks run, so callbacks may subscribe,
    /// unsubscribe, or send on this publisher again.
    pub fn send(&self) {
        let callbacks: Vec<Arc<Callback>> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|s| s.callback.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(|s| s.callback.upgrade())
                .collect()
        };

        for callback in callbacks {
            callback();
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|s| s.callback.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a callback registered with a [`Publisher`]. Unsubscribes on drop.
pub struct Subscription {
    id: SubscriptionId,
    publisher: Weak<SubscriberList>,
    _callback: Arc<Callback>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // the publisher may already be gone
        if let Some(subscribers) = self.publisher.upgrade() {
            let mut subscribers = subscribers.lock();
            if let Some(pos) = subscribers.iter().position(|s| s.id == self.id) {
                subscribers.remove(pos);
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn send_reaches_every_subscriber() {
        let publisher = Publisher::new();
        let (a, fa) = counter();
        let (b, fb) = counter();
        let _sa = publisher.subscribe(fa);
        let _sb = publisher.subscribe(fb);

        publisher.send();
        publisher.send();

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
        assert_eq!(publisher.subscriber_count(), 2);
    }

    #[test]
    fn dropped_subscription_is_not_called() {
        let publisher = Publisher::new();
        let (count, f) = counter();
        let sub = publisher.subscribe(f);
        publisher.send();
        drop(sub);
        publisher.send();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outlives_publisher() {
        let publisher = Publisher::new();
        let (_, f) = counter();
        let sub = publisher.subscribe(f);
        drop(publisher);
        // must not panic
        drop(sub);
    }

    #[test]
    fn callbacks_may_reenter() {
        let publisher = Publisher::new();
        let inner = publisher.clone();
        let (count, f) = counter();
        let _counting = publisher.subscribe(f);
        let _reentrant = publisher.subscribe(move || {
            // subscribing from inside a notification must not deadlock
            let _ = inner.subscriber_count();
        });

        publisher.send();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn channel_receives_ticks() {
        let publisher = Publisher::new();
        let (sub, recv) = publisher.channel();
        publisher.send();
        publisher.send();
        assert_eq!(recv.try_iter().count(), 2);

        drop(sub);
        publisher.send();
        assert!(recv.try_recv().is_err());
    }
}
