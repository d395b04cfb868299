use std::sync::Arc;

use anyhow::Result;
use notebook_api::{NotebookId, UserId};
use tracing::debug;

use crate::{
    codec::LogicalType,
    model::{now_millis, Message},
    services::storage::WatermarkStore,
    sync::ChannelView,
};

/// Number of chat messages newer than `watermark`.
pub fn compute_unread<'a>(messages: impl IntoIterator<Item = &'a Message>, watermark: i64) -> usize {
    messages
        .into_iter()
        .filter(|m| m.logical_type == LogicalType::Chat && m.timestamp > watermark)
        .count()
}

/// Unread chat state for one user in one notebook.
pub struct UnreadTracker {
    store: Arc<WatermarkStore>,
    user: UserId,
    notebook: NotebookId,
    watermark: i64,
    chat_visible: bool,
}

impl UnreadTracker {
    pub async fn load(store: Arc<WatermarkStore>, user: UserId, notebook: NotebookId) -> Self {
        let watermark = store.get(user, notebook).await;
        Self {
            store,
            user,
            notebook,
            watermark,
            chat_visible: false,
        }
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn unread(&self, view: &ChannelView) -> usize {
        compute_unread(&view.chat, self.watermark)
    }

    /// Track chat visibility. Only the hidden -> visible transition marks
    /// the chat as viewed; returns whether it did.
    pub async fn set_chat_visible(&mut self, visible: bool) -> Result<bool> {
        let opening = visible && !self.chat_visible;
        self.chat_visible = visible;
        if opening {
            self.mark_viewed_at(now_millis()).await?;
        }
        Ok(opening)
    }

    /// Move the watermark to `now`, never backwards, and persist it.
    pub async fn mark_viewed_at(&mut self, now: i64) -> Result<()> {
        self.watermark = self.store.advance(self.user, self.notebook, now).await?;
        debug!(notebook = self.notebook, watermark = self.watermark, "chat viewed");
        Ok(())
    }
}
