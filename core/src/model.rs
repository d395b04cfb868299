use notebook_api::{
    MessageId, NotebookId, PageId, Role, UserId, Visibility, WireMessage, WireNotebook, WirePage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime};
use tracing::warn;

use crate::codec::{self, LogicalType};

/// A decoded channel message.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: NotebookId,
    pub author_id: UserId,
    pub author_name: Option<String>,
    /// Text exactly as stored, tag included.
    pub raw_text: String,
    pub display_text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub logical_type: LogicalType,
}

impl Message {
    pub fn from_wire(wire: WireMessage) -> Self {
        let decoded = codec::decode(&wire.message_text);
        let timestamp = parse_timestamp(&wire.timestamp).unwrap_or_else(|| {
            warn!(id = wire.message_id, "unparseable message timestamp {}", wire.timestamp);
            0
        });
        Self {
            id: wire.message_id,
            channel_id: wire.notebook_id,
            author_id: wire.user_id,
            author_name: wire.user_name,
            raw_text: wire.message_text,
            display_text: decoded.display_text,
            timestamp,
            logical_type: decoded.logical_type,
        }
    }

    /// Sort key: timestamp, then id.
    pub fn order_key(&self) -> (i64, MessageId) {
        (self.timestamp, self.id)
    }

    /// Name to show for the author, falling back to the numeric id.
    pub fn author_label(&self) -> String {
        self.author_name
            .clone()
            .unwrap_or_else(|| self.author_id.to_string())
    }
}

/// Parse a backend timestamp into epoch milliseconds.
///
/// Accepts `yyyy-MM-dd'T'HH:mm:ss.SSSZ`, RFC 3339, or a bare number of
/// milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let backend = format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
            );
            let parsed = OffsetDateTime::parse(s, backend)
                .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
                .ok()?;
            Some((parsed.unix_timestamp_nanos() / 1_000_000) as i64)
        }
        _ => None,
    }
}

/// Current wall clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// One page of a notebook being edited.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Page {
    server_id: Option<PageId>,
    pub content: String,
}

impl Page {
    /// A fresh page that has never been persisted.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A new page with text that has not been saved yet.
    pub fn draft(content: impl Into<String>) -> Self {
        Self {
            server_id: None,
            content: content.into(),
        }
    }

    pub fn persisted(server_id: PageId, content: impl Into<String>) -> Self {
        Self {
            server_id: Some(server_id),
            content: content.into(),
        }
    }

    pub fn server_id(&self) -> Option<PageId> {
        self.server_id
    }

    /// Record the id issued on first creation. An id is assigned at most once.
    pub(crate) fn assign_server_id(&mut self, id: PageId) {
        if self.server_id.is_none() {
            self.server_id = Some(id);
        } else {
            warn!(existing = ?self.server_id, id, "ignoring second server id for page");
        }
    }

    /// Whether a save would skip this page entirely.
    pub fn is_ephemeral(&self) -> bool {
        self.server_id.is_none() && self.content.trim().is_empty()
    }
}

impl From<WirePage> for Page {
    fn from(wire: WirePage) -> Self {
        Page::persisted(wire.note_id, wire.content)
    }
}

/// Read-mostly notebook context.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub id: NotebookId,
    pub title: String,
    pub course_name: Option<String>,
    pub visibility: Visibility,
    pub owner_id: UserId,
    pub role: Option<Role>,
}

impl From<WireNotebook> for Notebook {
    fn from(wire: WireNotebook) -> Self {
        Self {
            id: wire.notebook_id,
            title: wire.title,
            course_name: wire.course_name,
            visibility: wire.visibility,
            owner_id: wire.owner_id,
            role: wire.user_role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(text: &str, ts: Value) -> WireMessage {
        WireMessage {
            message_id: 1,
            notebook_id: 9,
            user_id: 2,
            user_name: None,
            message_text: text.into(),
            timestamp: ts,
        }
    }

    #[test]
    fn backend_timestamp_format() {
        let ms = parse_timestamp(&json!("2025-03-01T10:15:30.123+0000")).unwrap();
        assert_eq!(ms, 1_740_824_130_123);
        let shifted = parse_timestamp(&json!("2025-03-01T11:15:30.123+0100")).unwrap();
        assert_eq!(ms, shifted);
    }

    #[test]
    fn rfc3339_and_millis() {
        assert_eq!(
            parse_timestamp(&json!("2025-03-01T10:15:30.123Z")),
            Some(1_740_824_130_123)
        );
        assert_eq!(parse_timestamp(&json!(42)), Some(42));
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn from_wire_decodes_tag() {
        let msg = Message::from_wire(wire("[TYPE:chat]yo", json!(5)));
        assert_eq!(msg.logical_type, LogicalType::Chat);
        assert_eq!(msg.display_text, "yo");
        assert_eq!(msg.raw_text, "[TYPE:chat]yo");
        assert_eq!(msg.timestamp, 5);
        assert_eq!(msg.author_label(), "2");
    }

    #[test]
    fn bad_timestamp_still_decodes() {
        let msg = Message::from_wire(wire("legacy", json!("???")));
        assert_eq!(msg.timestamp, 0);
        assert_eq!(msg.logical_type, LogicalType::Sticky);
    }

    #[test]
    fn server_id_is_set_once() {
        let mut page = Page::blank();
        assert!(page.is_ephemeral());
        page.assign_server_id(3);
        page.assign_server_id(4);
        assert_eq!(page.server_id(), Some(3));
        assert!(!page.is_ephemeral());
    }
}
