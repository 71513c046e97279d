mod actor;
mod messages;
mod subscription;

use crate::events::TransitionEvent;
use actor::Actor;
use messages::FeedMessage;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use subscription::Mailbox;
pub use subscription::{Subscription, SubscriptionId};
use tokio::sync::mpsc;

/// Fans transition events out to subscribers.
///
/// This struct is an actor handle. Publishing only enqueues the event, the actor
/// spawned by `MonitorFeedHandle::spawn` copies it into every live subscriber's
/// bounded mailbox. A full mailbox loses its oldest event instead of stalling
/// the publisher.
#[derive(Clone)]
pub struct MonitorFeedHandle {
    sender: mpsc::UnboundedSender<FeedMessage>,
    buffer_capacity: usize,
    next_id: Arc<AtomicU64>,
}

impl MonitorFeedHandle {
    pub fn spawn(buffer_capacity: usize) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        Actor::spawn(inbox);
        Self {
            sender,
            buffer_capacity,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with_capacity(self.buffer_capacity)
    }

    pub fn subscribe_with_capacity(&self, capacity: usize) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mailbox = Arc::new(Mailbox::new(id, capacity));
        if self
            .sender
            .send(FeedMessage::Subscribe {
                mailbox: mailbox.clone(),
            })
            .is_err()
        {
            mailbox.close();
        }
        Subscription::new(mailbox)
    }

    /// Same as [`Subscription::unsubscribe`]. Idempotent.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        subscription.unsubscribe();
    }

    pub(crate) fn publish(&self, event: TransitionEvent) {
        let _ = self.sender.send(FeedMessage::Publish { event });
    }
}
