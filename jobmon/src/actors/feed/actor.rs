use super::messages::FeedMessage;
use super::subscription::Mailbox;
use crate::events::TransitionEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

pub struct Actor {
    inbox: mpsc::UnboundedReceiver<FeedMessage>,
    subscribers: Vec<Arc<Mailbox>>,
}

impl Actor {
    pub fn spawn(inbox: mpsc::UnboundedReceiver<FeedMessage>) {
        let actor = Actor {
            inbox,
            subscribers: Vec::new(),
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        while let Some(msg) = self.inbox.recv().await {
            use self::FeedMessage::*;
            match msg {
                Subscribe { mailbox } => self.subscribe(mailbox),
                Publish { event } => self.broadcast(&event),
            }
        }
        // every publisher is gone, end all subscriptions
        for mailbox in self.subscribers.drain(..) {
            mailbox.close();
        }
    }

    fn subscribe(&mut self, mailbox: Arc<Mailbox>) {
        // forget watchers that left while nothing was published
        self.subscribers.retain(|mailbox| !mailbox.is_closed());
        self.subscribers.push(mailbox);
    }

    fn broadcast(&mut self, event: &TransitionEvent) {
        // only retain subscribers who have not unsubscribed
        self.subscribers.retain(|mailbox| mailbox.deliver(event));
        trace!(
            job_id = %event.job_id,
            subscribers = self.subscribers.len(),
            "transition broadcast"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_forgets_closed_mailboxes() {
        let (_sender, inbox) = mpsc::unbounded_channel();
        let mut actor = Actor {
            inbox,
            subscribers: Vec::new(),
        };

        for id in 0..10 {
            let mailbox = Arc::new(Mailbox::new(id, 4));
            actor.subscribe(mailbox.clone());
            mailbox.close();
        }
        let live = Arc::new(Mailbox::new(10, 4));
        actor.subscribe(live.clone());

        assert_eq!(actor.subscribers.len(), 1);
        assert!(Arc::ptr_eq(&actor.subscribers[0], &live));
    }
}
