pub mod entry;
pub mod transform;
pub mod view;

use serde_json::Value;

use crate::domain::PostRecord;

pub use entry::{TimelineEntry, TimelineItem};
pub use transform::transform;
pub use view::PostView;

const ADD_ENTRIES: &str = "TimelineAddEntries";
const SINGLE_ENTRY_INSTRUCTIONS: [&str; 2] = ["TimelinePinEntry", "TimelineReplaceEntry"];
const BOTTOM_CURSOR: &str = "Bottom";

/// Per-page counts used by the crawler to decide whether to continue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Leaf entries carrying a post result.
    pub posts: usize,
    /// Top-level entries that are not pagination cursors.
    pub entries: usize,
    pub bottom_cursor: Option<String>,
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Flatten pages into leaf post entries. Pages must be passed in fetch
    /// order; their outputs are concatenated.
    pub fn normalize(&self, documents: &[Value]) -> Vec<TimelineItem> {
        documents
            .iter()
            .flat_map(|doc| self.normalize_document(doc))
            .collect()
    }

    /// Only `TimelineAddEntries` batches contribute; a pinned post sits outside
    /// timeline order and reappears at its real position anyway.
    pub fn normalize_document(&self, document: &Value) -> Vec<TimelineItem> {
        let mut items = Vec::new();
        for entry in instructions(document)
            .iter()
            .filter(|i| instruction_type(i) == Some(ADD_ENTRIES))
            .flat_map(instruction_entries)
        {
            walk(entry, &mut items);
        }
        items
    }

    /// Transform leaf entries into post records, dropping non-renderable nodes.
    pub fn posts(&self, items: &[TimelineItem]) -> Vec<PostRecord> {
        items
            .iter()
            .filter_map(|item| item.post_node())
            .filter_map(transform)
            .collect()
    }

    pub fn bottom_cursor(&self, document: &Value) -> Option<String> {
        instructions(document)
            .iter()
            .flat_map(instruction_entries)
            .find_map(|entry| match TimelineEntry::classify(entry) {
                TimelineEntry::Cursor { cursor_type, value }
                    if cursor_type == BOTTOM_CURSOR && !value.is_empty() =>
                {
                    Some(value)
                }
                _ => None,
            })
    }

    pub fn summarize(&self, document: &Value) -> PageSummary {
        let entries = instructions(document)
            .iter()
            .filter(|i| instruction_type(i) == Some(ADD_ENTRIES))
            .flat_map(instruction_entries)
            .filter(|e| !matches!(TimelineEntry::classify(e), TimelineEntry::Cursor { .. }))
            .count();

        let posts = self
            .normalize_document(document)
            .iter()
            .filter(|item| item.post_node().is_some())
            .count();

        PageSummary {
            posts,
            entries,
            bottom_cursor: self.bottom_cursor(document),
        }
    }
}

/// Depth-first, pre-order: a module's items land where the module appeared.
fn walk(node: &Value, out: &mut Vec<TimelineItem>) {
    match TimelineEntry::classify(node) {
        TimelineEntry::Tweet(item) => out.push(item),
        TimelineEntry::Module(items) => {
            for item in items {
                walk(item, out);
            }
        }
        TimelineEntry::Cursor { .. } | TimelineEntry::Unknown => {}
    }
}

fn instructions(document: &Value) -> &[Value] {
    document
        .pointer("/data/user/result/timeline/timeline/instructions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn instruction_type(instruction: &Value) -> Option<&str> {
    instruction.get("type").and_then(Value::as_str)
}

fn instruction_entries(instruction: &Value) -> Vec<&Value> {
    match instruction_type(instruction) {
        Some(ADD_ENTRIES) => instruction
            .get("entries")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().collect())
            .unwrap_or_default(),
        Some(kind) if SINGLE_ENTRY_INSTRUCTIONS.contains(&kind) => {
            instruction.get("entry").into_iter().collect()
        }
        _ => Vec::new(),
    }
}
