use super::subscription::Mailbox;
use crate::events::TransitionEvent;
use std::sync::Arc;

pub enum FeedMessage {
    Subscribe { mailbox: Arc<Mailbox> },
    Publish { event: TransitionEvent },
}
