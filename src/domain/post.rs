use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the timeline API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const API_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub screen_name: String,
    pub profile_image_url_https: String,
}

impl Author {
    pub fn at_handle(&self) -> String {
        format!("@{}", self.screen_name)
    }
}

/// A `t.co` link in the post text and where it really points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub expanded_url: String,
    pub display_url: String,
}

/// An attached photo, video or GIF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: String,
    /// The `t.co` link the API appends to the text for this attachment.
    pub url: String,
    pub media_url_https: String,
    pub expanded_url: String,
    /// Highest-bitrate mp4 for videos and GIFs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Media {
    /// The URL worth opening: the video file when there is one, else the image.
    pub fn best_url(&self) -> &str {
        self.video_url.as_deref().unwrap_or(&self.media_url_https)
    }
}

/// A self-contained, render-ready post derived from one raw post node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "id_str")]
    pub id: String,
    pub created_at: String,
    pub text: String,
    pub full_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub favorite_count: u64,
    pub reply_count: u64,
    pub retweet_count: u64,
    pub quote_count: u64,
    #[serde(default)]
    pub bookmark_count: u64,
    pub views: u64,
    pub like_url: String,
    pub reply_url: String,
    pub view_url: String,
    pub user: Author,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_tweet: Option<Box<PostRecord>>,
}

impl PostRecord {
    pub fn like_url(id: &str) -> String {
        format!("https://x.com/intent/like?tweet_id={}", id)
    }

    pub fn reply_url(id: &str) -> String {
        format!("https://x.com/intent/tweet?in_reply_to={}", id)
    }

    pub fn view_url(screen_name: &str, id: &str) -> String {
        format!("https://x.com/{}/status/{}", screen_name, id)
    }

    /// Parse `created_at`; `None` when the API sent something unexpected.
    pub fn posted_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.created_at, API_TIMESTAMP_FORMAT).ok()
    }

    /// Decoded text for display. The API escapes `&`, `<` and `>` in legacy
    /// text. Short links are expanded and media links removed; the
    /// attachments are listed separately.
    pub fn display_text(&self) -> String {
        let mut text = html_escape::decode_html_entities(&self.text).to_string();
        for link in self.urls.iter().filter(|l| !l.url.is_empty()) {
            let target = if link.expanded_url.is_empty() {
                &link.url
            } else {
                &link.expanded_url
            };
            text = text.replace(&link.url, target);
        }
        for media in self.media.iter().filter(|m| !m.url.is_empty()) {
            text = text.replace(&media.url, "");
        }
        text.trim_end().to_string()
    }

    pub fn display_author(&self) -> String {
        if self.user.name.is_empty() {
            self.user.at_handle()
        } else {
            format!("{} {}", self.user.name, self.user.at_handle())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PostRecord {
        PostRecord {
            id: "42".into(),
            created_at: "Wed Oct 10 20:19:24 +0000 2018".into(),
            text: "fish &amp; chips &lt;3".into(),
            user: Author {
                name: "Alice".into(),
                screen_name: "alice".into(),
                profile_image_url_https: String::new(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_url_derivation() {
        assert_eq!(
            PostRecord::like_url("42"),
            "https://x.com/intent/like?tweet_id=42"
        );
        assert_eq!(
            PostRecord::reply_url("42"),
            "https://x.com/intent/tweet?in_reply_to=42"
        );
        assert_eq!(
            PostRecord::view_url("alice", "42"),
            "https://x.com/alice/status/42"
        );
    }

    #[test]
    fn test_posted_at_parses_api_format() {
        let posted = record().posted_at().unwrap();
        assert_eq!(posted.format("%Y-%m-%d %H:%M").to_string(), "2018-10-10 20:19");
    }

    #[test]
    fn test_posted_at_invalid() {
        let mut post = record();
        post.created_at = "yesterday".into();
        assert!(post.posted_at().is_none());
    }

    #[test]
    fn test_display_text_decodes_entities() {
        assert_eq!(record().display_text(), "fish & chips <3");
    }

    #[test]
    fn test_display_text_expands_links_and_drops_media_links() {
        let mut post = record();
        post.text = "read https://t.co/abc https://t.co/pic".into();
        post.urls = vec![Link {
            url: "https://t.co/abc".into(),
            expanded_url: "https://example.com/article".into(),
            display_url: "example.com/article".into(),
        }];
        post.media = vec![Media {
            kind: "photo".into(),
            url: "https://t.co/pic".into(),
            media_url_https: "https://pbs.twimg.com/media/x.jpg".into(),
            ..Default::default()
        }];

        assert_eq!(post.display_text(), "read https://example.com/article");
    }

    #[test]
    fn test_media_best_url_prefers_video() {
        let mut media = Media {
            kind: "video".into(),
            media_url_https: "https://pbs.twimg.com/thumb.jpg".into(),
            ..Default::default()
        };
        assert_eq!(media.best_url(), "https://pbs.twimg.com/thumb.jpg");
        media.video_url = Some("https://video.twimg.com/v.mp4".into());
        assert_eq!(media.best_url(), "https://video.twimg.com/v.mp4");
    }

    #[test]
    fn test_display_author() {
        assert_eq!(record().display_author(), "Alice @alice");
        let mut post = record();
        post.user.name.clear();
        assert_eq!(post.display_author(), "@alice");
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["id_str"], "42");
        assert_eq!(value["user"]["screen_name"], "alice");
        assert!(value.get("quoted_tweet").is_none());
    }
}
