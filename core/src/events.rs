use notebook_api::{MessageId, NotebookId};
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Something a channel view should react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A fetch was applied; counts are of the visible view.
    Refreshed {
        notebook: NotebookId,
        sticky: usize,
        chat: usize,
    },
    /// A message was removed optimistically.
    Deleted {
        notebook: NotebookId,
        message: MessageId,
    },
    /// A poll failed; the previous view is kept.
    PollFailed { notebook: NotebookId, error: String },
}

/// Fan-out of events to every live subscriber. Receivers that were dropped
/// are pruned on the next publish.
pub struct EventBus<E> {
    subscribers: Vec<UnboundedSender<E>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<E> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: E) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
