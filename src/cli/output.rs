use serde::Serialize;

use crate::model::Record;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PostJson {
    pub id: String,
    pub seq: usize,
    pub screen_name: String,
    pub full_text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    pub media_count: usize,
    pub tags: Vec<String>,
}

impl From<&Record> for PostJson {
    fn from(record: &Record) -> Self {
        PostJson {
            id: record.id.to_string(),
            seq: record.seq,
            screen_name: record.screen_name.clone(),
            full_text: record.full_text.clone(),
            url: record.url.clone(),
            media_count: record.media.len(),
            tags: record.tags.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ListJson {
    pub count: usize,
    pub posts: Vec<PostJson>,
}

#[derive(Serialize)]
pub struct TagsJson {
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub posts: usize,
    pub with_media: usize,
    pub media_items: usize,
    pub distinct_tags: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_import: Option<String>,
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One post as a text block for `fv list`
pub fn print_post(record: &Record) {
    let handle = if record.screen_name.is_empty() {
        "(unknown)".to_string()
    } else {
        format!("@{}", record.screen_name)
    };
    println!("[{}] {}", record.id, handle);
    if !record.full_text.is_empty() {
        for line in record.full_text.lines() {
            println!("    {}", line);
        }
    }
    if !record.media.is_empty() {
        println!("    media: {}", media_summary(record));
    }
    if !record.tags.is_empty() {
        let tags: Vec<String> = record.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("    {}", tags.join(" "));
    }
}

/// `2 images, 1 video` style summary
pub fn media_summary(record: &Record) -> String {
    let images = record.media.iter().filter(|m| !m.kind.is_video()).count();
    let videos = record.media.len() - images;
    let mut parts = Vec::new();
    if images > 0 {
        parts.push(format!(
            "{} image{}",
            images,
            if images == 1 { "" } else { "s" }
        ));
    }
    if videos > 0 {
        parts.push(format!(
            "{} video{}",
            videos,
            if videos == 1 { "" } else { "s" }
        ));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MediaItem, MediaKind, RecordId};

    #[test]
    fn media_summary_counts_kinds() {
        let mut record = Record::new(RecordId::Int(1));
        record.media = vec![
            MediaItem {
                kind: MediaKind::Image,
                original: "a".into(),
            },
            MediaItem {
                kind: MediaKind::Image,
                original: "b".into(),
            },
            MediaItem {
                kind: MediaKind::AnimatedGif,
                original: "c".into(),
            },
        ];
        assert_eq!(media_summary(&record), "2 images, 1 video");
    }
}
