//! Classification of raw timeline entries into a closed set of kinds.

use serde::Serialize;
use serde_json::Value;

const ENTRY_TYPE_ITEM: &str = "TimelineTimelineItem";
const ENTRY_TYPE_CURSOR: &str = "TimelineTimelineCursor";
const ENTRY_TYPE_MODULE: &str = "TimelineTimelineModule";
const ITEM_TYPE_TWEET: &str = "TimelineTweet";

/// One node inside an instruction, or one item inside a module.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry<'a> {
    Tweet(TimelineItem),
    Cursor { cursor_type: String, value: String },
    Module(&'a [Value]),
    Unknown,
}

impl<'a> TimelineEntry<'a> {
    /// Classify a top-level entry (`{entryId, content: {...}}`) or a module item
    /// (`{entryId, item: {itemContent: {...}}}`).
    pub fn classify(node: &'a Value) -> Self {
        let entry_id = node.get("entryId").and_then(Value::as_str).unwrap_or("");
        let content = node.get("content");
        let entry_type = content
            .and_then(|c| c.get("entryType"))
            .and_then(Value::as_str);

        if entry_type == Some(ENTRY_TYPE_CURSOR) {
            return Self::cursor(content);
        }
        if let Some(content) = content {
            if content.get("cursorType").is_some() {
                return Self::cursor(Some(content));
            }
        }

        if let Some(items) = content
            .and_then(|c| c.get("items"))
            .and_then(Value::as_array)
        {
            return Self::Module(items.as_slice());
        }
        if entry_type == Some(ENTRY_TYPE_MODULE) {
            return Self::Module(&[]);
        }

        let item_content = content
            .and_then(|c| c.get("itemContent"))
            .or_else(|| node.get("item").and_then(|i| i.get("itemContent")));

        match item_content {
            Some(ic) => match ic.get("itemType").and_then(Value::as_str) {
                Some(ITEM_TYPE_TWEET) => Self::Tweet(TimelineItem {
                    entry_id: entry_id.to_string(),
                    item_content: ic.clone(),
                }),
                Some(ENTRY_TYPE_CURSOR) => Self::cursor(Some(ic)),
                item_type => {
                    tracing::debug!(entry_id, ?item_type, "Skipping non-post timeline item");
                    Self::Unknown
                }
            },
            None => {
                if entry_type.is_some() && entry_type != Some(ENTRY_TYPE_ITEM) {
                    tracing::debug!(entry_id, ?entry_type, "Unrecognized timeline entry type");
                }
                Self::Unknown
            }
        }
    }

    fn cursor(content: Option<&Value>) -> Self {
        let field = |name: &str| {
            content
                .and_then(|c| c.get(name))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        Self::Cursor {
            cursor_type: field("cursorType"),
            value: field("value"),
        }
    }
}

/// A leaf post entry produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    #[serde(rename = "entryId")]
    pub entry_id: String,
    #[serde(rename = "itemContent")]
    pub item_content: Value,
}

impl TimelineItem {
    /// The raw post node, with visibility wrappers removed.
    pub fn post_node(&self) -> Option<&Value> {
        self.item_content
            .get("tweet_results")
            .and_then(|r| r.get("result"))
            .map(unwrap_visibility)
    }
}

/// Results limited by visibility rules nest the actual post under `tweet`.
pub fn unwrap_visibility(node: &Value) -> &Value {
    match node.get("__typename").and_then(Value::as_str) {
        Some("TweetWithVisibilityResults") => node.get("tweet").unwrap_or(node),
        _ => node,
    }
}
