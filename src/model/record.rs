use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable record identifier.
///
/// Archive exports in the wild carry numeric post ids; hand-edited files may
/// carry strings. Both forms are accepted and compared by value, so `42` and
/// `"42"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Int(n)
    }
}

/// Kind of an attached media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    AnimatedGif,
    /// Catch-all so one unrecognized media entry does not sink an import
    #[serde(other)]
    Unknown,
}

impl MediaKind {
    /// Whether this item is rendered through a video element
    pub fn is_video(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::AnimatedGif)
    }

    /// Short label for presentation
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::AnimatedGif => "gif",
            MediaKind::Unknown => "media",
        }
    }
}

/// One attached image/video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// URL or path of the full-size asset; opaque to the core
    #[serde(default)]
    pub original: String,
}

/// One archived post with its merged tag history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Display-order index, assigned by the store on every full rewrite.
    /// Never trusted from an import.
    #[serde(default)]
    pub seq: usize,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    /// User-assigned tags, in insertion order; duplicates are legal
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record {
    /// Create a bare record with the given id and no content
    pub fn new(id: RecordId) -> Self {
        Record {
            id,
            seq: 0,
            screen_name: String::new(),
            full_text: String::new(),
            url: String::new(),
            media: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }
}
