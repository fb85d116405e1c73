//! Typed, default-valued accessors over a raw post node.

use serde_json::Value;

use super::entry::unwrap_visibility;
use crate::domain::{Link, Media};

#[derive(Debug, Clone, Copy)]
pub struct PostView<'a> {
    node: &'a Value,
}

impl<'a> PostView<'a> {
    pub fn new(node: &'a Value) -> Self {
        Self { node }
    }

    /// The legacy content block, if present.
    pub fn legacy(&self) -> Option<&'a Value> {
        self.node.get("legacy").filter(|l| l.is_object())
    }

    pub fn id(&self) -> String {
        str_at(self.node, &["rest_id"])
            .or_else(|| self.legacy().and_then(|l| str_at(l, &["id_str"])))
            .unwrap_or_default()
    }

    pub fn created_at(&self) -> String {
        self.legacy_str("created_at").unwrap_or_default()
    }

    pub fn lang(&self) -> Option<String> {
        self.legacy_str("lang")
    }

    pub fn note_text(&self) -> Option<String> {
        str_at(
            self.node,
            &["note_tweet", "note_tweet_results", "result", "text"],
        )
    }

    pub fn full_text(&self) -> Option<String> {
        self.legacy_str("full_text")
    }

    /// Long-form note body first, then legacy text, then empty.
    pub fn text(&self) -> String {
        self.note_text()
            .or_else(|| self.full_text())
            .unwrap_or_default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.legacy()
            .and_then(|l| l.get(name))
            .map(coerce_u64)
            .unwrap_or(0)
    }

    pub fn views(&self) -> u64 {
        self.node
            .get("views")
            .and_then(|v| v.get("count"))
            .map(coerce_u64)
            .unwrap_or(0)
    }

    pub fn author_name(&self) -> String {
        self.user_str(&["core", "name"], &["legacy", "name"])
    }

    pub fn screen_name(&self) -> String {
        self.user_str(&["core", "screen_name"], &["legacy", "screen_name"])
    }

    pub fn avatar_url(&self) -> String {
        self.user_str(
            &["avatar", "image_url"],
            &["legacy", "profile_image_url_https"],
        )
    }

    /// Short links in the text. A long-form note carries its own entity set,
    /// whose offsets match the note body rather than the truncated text.
    pub fn links(&self) -> Vec<Link> {
        let note_urls = array_at(
            self.node,
            &["note_tweet", "note_tweet_results", "result", "entity_set", "urls"],
        );
        let urls = if self.note_text().is_some() && !note_urls.is_empty() {
            note_urls
        } else {
            self.legacy()
                .map(|l| array_at(l, &["entities", "urls"]))
                .unwrap_or(&[])
        };

        urls.iter()
            .map(|u| Link {
                url: str_at(u, &["url"]).unwrap_or_default(),
                expanded_url: str_at(u, &["expanded_url"]).unwrap_or_default(),
                display_url: str_at(u, &["display_url"]).unwrap_or_default(),
            })
            .filter(|l| !l.url.is_empty())
            .collect()
    }

    /// Attachments from `extended_entities`, falling back to `entities.media`
    /// which lists only the first photo of a set.
    pub fn media(&self) -> Vec<Media> {
        let Some(legacy) = self.legacy() else {
            return Vec::new();
        };
        let extended = array_at(legacy, &["extended_entities", "media"]);
        let items = if extended.is_empty() {
            array_at(legacy, &["entities", "media"])
        } else {
            extended
        };

        items
            .iter()
            .map(|m| Media {
                kind: str_at(m, &["type"]).unwrap_or_else(|| "photo".to_string()),
                url: str_at(m, &["url"]).unwrap_or_default(),
                media_url_https: str_at(m, &["media_url_https"]).unwrap_or_default(),
                expanded_url: str_at(m, &["expanded_url"]).unwrap_or_default(),
                video_url: best_video_variant(m),
            })
            .filter(|m| !m.media_url_https.is_empty())
            .collect()
    }

    pub fn hashtags(&self) -> Vec<String> {
        self.entity_strings("hashtags", "text")
    }

    pub fn mentions(&self) -> Vec<String> {
        self.entity_strings("user_mentions", "screen_name")
    }

    fn entity_strings(&self, kind: &str, field: &str) -> Vec<String> {
        self.legacy()
            .map(|l| array_at(l, &["entities", kind]))
            .unwrap_or(&[])
            .iter()
            .filter_map(|e| str_at(e, &[field]))
            .collect()
    }

    pub fn quoted(&self) -> Option<PostView<'a>> {
        self.node
            .get("quoted_status_result")
            .and_then(|q| q.get("result"))
            .map(|q| PostView::new(unwrap_visibility(q)))
    }

    fn legacy_str(&self, name: &str) -> Option<String> {
        self.legacy().and_then(|l| str_at(l, &[name]))
    }

    fn user_str(&self, current: &[&str], fallback: &[&str]) -> String {
        let Some(user) = self
            .node
            .get("core")
            .and_then(|c| c.get("user_results"))
            .and_then(|u| u.get("result"))
        else {
            return String::new();
        };
        str_at(user, current)
            .or_else(|| str_at(user, fallback))
            .unwrap_or_default()
    }
}

fn str_at(node: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(node, |cur, key| cur.get(*key))
        .and_then(Value::as_str)
        .map(String::from)
}

fn array_at<'v>(node: &'v Value, path: &[&str]) -> &'v [Value] {
    path.iter()
        .try_fold(node, |cur, key| cur.get(*key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Highest-bitrate mp4 among `video_info.variants`; HLS playlists are skipped.
fn best_video_variant(media: &Value) -> Option<String> {
    array_at(media, &["video_info", "variants"])
        .iter()
        .filter(|v| str_at(v, &["content_type"]).as_deref() == Some("video/mp4"))
        .max_by_key(|v| v.get("bitrate").map(coerce_u64).unwrap_or(0))
        .and_then(|v| str_at(v, &["url"]))
}

/// Numbers pass through, numeric strings are parsed, everything else is zero.
fn coerce_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_u64() {
        assert_eq!(coerce_u64(&json!(12)), 12);
        assert_eq!(coerce_u64(&json!("3456")), 3456);
        assert_eq!(coerce_u64(&json!(" 7 ")), 7);
        assert_eq!(coerce_u64(&json!(2.0)), 2);
        assert_eq!(coerce_u64(&json!(-5)), 0);
        assert_eq!(coerce_u64(&json!("many")), 0);
        assert_eq!(coerce_u64(&json!(null)), 0);
        assert_eq!(coerce_u64(&json!({})), 0);
    }

    #[test]
    fn test_legacy_must_be_object() {
        let node = json!({ "legacy": "nope" });
        assert!(PostView::new(&node).legacy().is_none());
    }

    #[test]
    fn test_id_falls_back_to_legacy_id_str() {
        let node = json!({ "legacy": { "id_str": "77" } });
        assert_eq!(PostView::new(&node).id(), "77");
        let node = json!({});
        assert_eq!(PostView::new(&node).id(), "");
    }

    #[test]
    fn test_author_current_shape() {
        let node = json!({
            "core": { "user_results": { "result": {
                "core": { "name": "Alice", "screen_name": "alice" },
                "avatar": { "image_url": "https://pbs.twimg.com/a.jpg" }
            }}}
        });
        let view = PostView::new(&node);
        assert_eq!(view.author_name(), "Alice");
        assert_eq!(view.screen_name(), "alice");
        assert_eq!(view.avatar_url(), "https://pbs.twimg.com/a.jpg");
    }

    #[test]
    fn test_author_legacy_shape() {
        let node = json!({
            "core": { "user_results": { "result": {
                "legacy": {
                    "name": "Bob",
                    "screen_name": "bob",
                    "profile_image_url_https": "https://pbs.twimg.com/b.jpg"
                }
            }}}
        });
        let view = PostView::new(&node);
        assert_eq!(view.author_name(), "Bob");
        assert_eq!(view.screen_name(), "bob");
        assert_eq!(view.avatar_url(), "https://pbs.twimg.com/b.jpg");
    }

    #[test]
    fn test_author_partially_missing() {
        let node = json!({ "core": { "user_results": { "result": {
            "core": { "screen_name": "carol" }
        }}}});
        let view = PostView::new(&node);
        assert_eq!(view.author_name(), "");
        assert_eq!(view.screen_name(), "carol");
        assert_eq!(view.avatar_url(), "");
    }

    #[test]
    fn test_views_string_count() {
        let node = json!({ "views": { "count": "1024", "state": "EnabledWithCount" } });
        assert_eq!(PostView::new(&node).views(), 1024);
        let node = json!({ "views": { "state": "Enabled" } });
        assert_eq!(PostView::new(&node).views(), 0);
    }
}
