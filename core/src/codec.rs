//! Channel tag codec.
//!
//! The backend keeps a single text column per message, so the channel a
//! message belongs to travels as a leading `[TYPE:<kind>]` token inside that
//! text. Untagged text is legacy data and decodes as a sticky note.

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[TYPE:(sticky|chat)\]").unwrap());

/// Which sub-stream of a notebook channel a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    /// Persistent note pinned to the notebook.
    #[default]
    Sticky,
    /// Ephemeral live chat line.
    Chat,
}

impl LogicalType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalType::Sticky => "sticky",
            LogicalType::Chat => "chat",
        }
    }

    /// The tag token prepended to stored text.
    pub fn tag(self) -> String {
        format!("[TYPE:{}]", self.as_str())
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sticky" => Ok(LogicalType::Sticky),
            "chat" => Ok(LogicalType::Chat),
            other => Err(format!("unknown message kind {other}")),
        }
    }
}

/// Result of decoding stored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub logical_type: LogicalType,
    pub display_text: String,
}

/// Tag `text` for storage.
pub fn encode(logical_type: LogicalType, text: &str) -> String {
    let mut raw = logical_type.tag();
    raw.push_str(text);
    raw
}

/// Split stored text into its kind and display text. Never fails.
pub fn decode(raw: &str) -> Decoded {
    match TAG_RE.captures(raw) {
        Some(caps) => {
            let logical_type = match &caps[1] {
                "chat" => LogicalType::Chat,
                _ => LogicalType::Sticky,
            };
            Decoded {
                logical_type,
                display_text: raw[caps[0].len()..].to_string(),
            }
        }
        None => Decoded {
            logical_type: LogicalType::Sticky,
            display_text: raw.to_string(),
        },
    }
}
