use crate::events::TransitionEvent;
use futures::Stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::warn;

pub type SubscriptionId = u64;

struct Buffer {
    events: VecDeque<TransitionEvent>,
    capacity: usize,
    dropped: u64,
    closed: bool,
}

/// Bounded queue shared by the feed actor (writer) and one [`Subscription`] (reader).
///
/// `closed` is only read and written under the buffer lock, so once `close`
/// returns no later `deliver` can enqueue anything.
pub struct Mailbox {
    id: SubscriptionId,
    buffer: Mutex<Buffer>,
    ready: Notify,
}

impl Mailbox {
    pub fn new(id: SubscriptionId, capacity: usize) -> Self {
        Self {
            id,
            buffer: Mutex::new(Buffer {
                events: VecDeque::new(),
                capacity: capacity.max(1),
                dropped: 0,
                closed: false,
            }),
            ready: Notify::new(),
        }
    }

    fn buffer(&self) -> MutexGuard<'_, Buffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue `event`, evicting the oldest one when full.
    /// Returns false once the mailbox is closed.
    pub fn deliver(&self, event: &TransitionEvent) -> bool {
        let mut buffer = self.buffer();
        if buffer.closed {
            return false;
        }
        if buffer.events.len() >= buffer.capacity {
            buffer.events.pop_front();
            buffer.dropped += 1;
            warn!(
                subscription = self.id,
                dropped = buffer.dropped,
                "subscriber buffer full, dropped oldest event"
            );
        }
        buffer.events.push_back(event.clone());
        drop(buffer);
        self.ready.notify_one();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.buffer().closed
    }

    pub fn close(&self) {
        let mut buffer = self.buffer();
        buffer.closed = true;
        buffer.events = VecDeque::new();
        drop(buffer);
        // wake a reader parked in `recv`
        self.ready.notify_one();
    }
}

/// A live view of the transitions published after it was created.
///
/// Dropping the subscription unsubscribes it.
pub struct Subscription {
    mailbox: Arc<Mailbox>,
}

impl Subscription {
    pub(crate) fn new(mailbox: Arc<Mailbox>) -> Self {
        Self { mailbox }
    }

    pub fn id(&self) -> SubscriptionId {
        self.mailbox.id
    }

    /// Wait for the next event. `None` once unsubscribed or the feed has shut down.
    pub async fn recv(&mut self) -> Option<TransitionEvent> {
        loop {
            let ready = self.mailbox.ready.notified();
            {
                let mut buffer = self.mailbox.buffer();
                if buffer.closed {
                    return None;
                }
                if let Some(event) = buffer.events.pop_front() {
                    return Some(event);
                }
            }
            ready.await;
        }
    }

    /// Take a buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<TransitionEvent> {
        let mut buffer = self.mailbox.buffer();
        if buffer.closed {
            return None;
        }
        buffer.events.pop_front()
    }

    /// Number of events lost to overflow so far.
    pub fn dropped(&self) -> u64 {
        self.mailbox.buffer().dropped
    }

    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    /// Stop delivery and release buffered events. Safe to call more than once.
    pub fn unsubscribe(&self) {
        self.mailbox.close();
    }

    pub fn into_stream(self) -> impl Stream<Item = TransitionEvent> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.mailbox.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::JobState;
    use crate::types;

    fn event(n: usize) -> TransitionEvent {
        TransitionEvent {
            job_id: format!("J{}", n).into(),
            from: JobState::Waiting,
            to: JobState::Running,
            at: types::now(),
        }
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut subscription = Subscription::new(Arc::new(Mailbox::new(1, 2)));
        for n in 0..5 {
            assert!(subscription.mailbox.deliver(&event(n)));
        }
        assert_eq!(subscription.dropped(), 3);
        let kept: Vec<_> = std::iter::from_fn(|| subscription.try_recv())
            .map(|e| e.job_id.to_string())
            .collect();
        assert_eq!(kept, vec!["J3", "J4"]);
    }

    #[test]
    fn closed_mailbox_rejects_delivery() {
        let mut subscription = Subscription::new(Arc::new(Mailbox::new(1, 8)));
        assert!(subscription.mailbox.deliver(&event(0)));
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(subscription.is_closed());
        assert!(!subscription.mailbox.deliver(&event(1)));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn recv_wakes_on_delivery_and_close() {
        let mailbox = Arc::new(Mailbox::new(1, 8));
        let mut subscription = Subscription::new(mailbox.clone());

        let writer = mailbox.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            writer.deliver(&event(7));
            writer.close();
        });

        // the event may or may not arrive before the close, but recv never hangs
        let first = subscription.recv().await;
        assert!(first.map_or(true, |e| e.job_id.as_str() == "J7"));
        assert_eq!(subscription.recv().await, None);
    }
}
