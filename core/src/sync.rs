//! Notebook channel synchronizer.
//!
//! One backend message list carries two sub-streams (sticky notes and live
//! chat). The synchronizer polls that list, decodes it, and keeps a local
//! view that is replaced wholesale by the latest applied fetch. Each fetch is
//! stamped with a sequence number when issued; a response whose sequence is
//! not newer than the last applied one is dropped.

use std::{collections::HashMap, sync::Arc, time::Duration};

use notebook_api::{MessageId, NotebookId};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    backend::Backend,
    codec::{self, LogicalType},
    error::{CoreError, CoreResult},
    events::{EventBus, SyncEvent},
    model::Message,
    services::timer,
};

/// Snapshot of a channel split into its two sub-streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelView {
    pub sticky: Vec<Message>,
    pub chat: Vec<Message>,
}

/// Text being composed for one sub-stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub kind: LogicalType,
    pub text: String,
}

impl Draft {
    pub fn new(kind: LogicalType) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }
}

struct ChannelState {
    messages: Vec<Message>,
    /// Optimistically removed ids, with the issue counter at deletion time.
    pending_deletions: HashMap<MessageId, u64>,
    issued: u64,
    applied: u64,
    closed: bool,
    events: EventBus<SyncEvent>,
}

impl ChannelState {
    fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| !self.pending_deletions.contains_key(&m.id))
    }
}

pub struct ChannelSync {
    backend: Arc<dyn Backend>,
    notebook: NotebookId,
    state: Mutex<ChannelState>,
}

impl ChannelSync {
    pub fn new(backend: Arc<dyn Backend>, notebook: NotebookId) -> Self {
        Self {
            backend,
            notebook,
            state: Mutex::new(ChannelState {
                messages: Vec::new(),
                pending_deletions: HashMap::new(),
                issued: 0,
                applied: 0,
                closed: false,
                events: EventBus::new(),
            }),
        }
    }

    pub fn notebook(&self) -> NotebookId {
        self.notebook
    }

    /// Start polling every `every`, beginning immediately. Polling stops and
    /// the channel closes when the handle is dropped.
    ///
    /// Reopening a closed channel re-arms it; fetches issued before the
    /// close stay discarded.
    pub fn open(self: &Arc<Self>, every: Duration) -> PollHandle {
        {
            let mut st = self.state.lock();
            if st.closed {
                st.closed = false;
                st.applied = st.issued;
            }
        }
        info!(notebook = self.notebook, ?every, "opening channel");
        PollHandle {
            sync: self.clone(),
            task: timer::spawn_poller(self.clone(), every),
        }
    }

    /// Stop applying results. Requests already in flight run to completion
    /// but their responses are discarded.
    pub fn close(&self) {
        let mut st = self.state.lock();
        if !st.closed {
            info!(notebook = self.notebook, "closing channel");
            st.closed = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn subscribe(&self) -> UnboundedReceiver<SyncEvent> {
        self.state.lock().events.subscribe()
    }

    /// Current view, ordered by timestamp then id.
    pub fn view(&self) -> ChannelView {
        let st = self.state.lock();
        let mut view = ChannelView::default();
        for msg in st.visible() {
            match msg.logical_type {
                LogicalType::Sticky => view.sticky.push(msg.clone()),
                LogicalType::Chat => view.chat.push(msg.clone()),
            }
        }
        view
    }

    /// Fetch the full message list and replace the view with it.
    ///
    /// Returns `Ok(false)` when the response was discarded as stale or
    /// because the channel closed meanwhile. On failure the previous view is
    /// kept.
    pub async fn refresh(&self) -> CoreResult<bool> {
        let seq = {
            let mut st = self.state.lock();
            if st.closed {
                return Ok(false);
            }
            st.issued += 1;
            st.issued
        };
        debug!(notebook = self.notebook, seq, "fetching messages");

        let fetched = match self.backend.list_messages(self.notebook).await {
            Ok(list) => list,
            Err(err) => {
                warn!(notebook = self.notebook, seq, "poll failed: {err}");
                let mut st = self.state.lock();
                if !st.closed {
                    st.events.publish(SyncEvent::PollFailed {
                        notebook: self.notebook,
                        error: err.to_string(),
                    });
                }
                return Err(err);
            }
        };
        let mut messages: Vec<Message> = fetched.into_iter().map(Message::from_wire).collect();
        messages.sort_by_key(Message::order_key);

        let mut st = self.state.lock();
        if st.closed {
            debug!(notebook = self.notebook, seq, "channel closed, dropping response");
            return Ok(false);
        }
        if seq <= st.applied {
            debug!(
                notebook = self.notebook,
                seq,
                applied = st.applied,
                "dropping out-of-order response"
            );
            return Ok(false);
        }
        st.applied = seq;
        st.messages = messages;
        // A fetch issued after a deletion is authoritative for that id.
        st.pending_deletions.retain(|_, at| *at >= seq);

        let (mut sticky, mut chat) = (0, 0);
        for msg in st.visible() {
            match msg.logical_type {
                LogicalType::Sticky => sticky += 1,
                LogicalType::Chat => chat += 1,
            }
        }
        st.events.publish(SyncEvent::Refreshed {
            notebook: self.notebook,
            sticky,
            chat,
        });
        Ok(true)
    }

    /// Post a message to one sub-stream, then refresh.
    pub async fn send(&self, kind: LogicalType, text: &str) -> CoreResult<()> {
        let body = text.trim();
        if body.is_empty() {
            return Err(CoreError::validation("Message is required"));
        }
        let raw = codec::encode(kind, body);
        self.backend.send_message(self.notebook, &raw).await?;
        info!(notebook = self.notebook, %kind, "message sent");
        if let Err(err) = self.refresh().await {
            warn!(notebook = self.notebook, "refresh after send failed: {err}");
        }
        Ok(())
    }

    /// Send a draft. The text is cleared only when the send succeeds.
    pub async fn submit(&self, draft: &mut Draft) -> CoreResult<()> {
        self.send(draft.kind, &draft.text).await?;
        draft.text.clear();
        Ok(())
    }

    /// Remove a message from the view at once, then delete it remotely.
    ///
    /// A failed remote delete is not rolled back locally; the refresh that
    /// follows decides whether the message comes back.
    pub async fn delete(&self, id: MessageId) -> CoreResult<()> {
        {
            let mut st = self.state.lock();
            st.messages.retain(|m| m.id != id);
            let at = st.issued;
            st.pending_deletions.insert(id, at);
            st.events.publish(SyncEvent::Deleted {
                notebook: self.notebook,
                message: id,
            });
        }
        let result = self.backend.delete_message(id).await;
        match &result {
            Ok(_) => info!(notebook = self.notebook, id, "message deleted"),
            Err(err) => warn!(
                notebook = self.notebook,
                id, "delete failed, next poll decides: {err}"
            ),
        }
        if let Err(err) = self.refresh().await {
            warn!(notebook = self.notebook, "refresh after delete failed: {err}");
        }
        result.map(|_| ())
    }
}

/// Keeps a channel's poll timer alive. Dropping it cancels the timer and
/// closes the channel.
pub struct PollHandle {
    sync: Arc<ChannelSync>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn sync(&self) -> &Arc<ChannelSync> {
        &self.sync
    }

    /// Stop polling and close the channel.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        self.sync.close();
    }
}
