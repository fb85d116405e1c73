use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Value};

use crate::app::{ArchiveError, Result};
use crate::domain::PostRecord;
use crate::normalizer::TimelineItem;
use crate::store::PageStore;

const PAGES_DIR: &str = "pages";
const ENTRIES_FILE: &str = "entries.json";
const POSTS_FILE: &str = "posts.json";

/// Page archive laid out under a data directory:
///
/// ```text
/// <root>/pages/page_001.json
/// <root>/entries.json
/// <root>/posts.json
/// ```
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    pub fn page_file_name(page: usize) -> String {
        format!("page_{:03}.json", page)
    }

    fn is_page_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("page_") && n.ends_with(".json"))
    }

    fn write_json(&self, path: PathBuf, value: &impl serde::Serialize) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}

impl PageStore for FsPageStore {
    fn save_page(&self, page: usize, document: &Value) -> Result<PathBuf> {
        let path = self.pages_dir().join(Self::page_file_name(page));
        self.write_json(path, document)
    }

    fn list_pages(&self) -> Result<Vec<PathBuf>> {
        let dir = self.pages_dir();
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut pages = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.is_file() && Self::is_page_file(&path) {
                pages.push(path);
            }
        }
        // Zero-padded names sort in fetch order.
        pages.sort();
        Ok(pages)
    }

    fn clear_pages(&self) -> Result<usize> {
        let pages = self.list_pages()?;
        for path in &pages {
            fs::remove_file(path)?;
        }
        Ok(pages.len())
    }

    fn load_page(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ArchiveError::InvalidPage {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save_entries(&self, items: &[TimelineItem]) -> Result<PathBuf> {
        let document = json!({
            "total": items.len(),
            "entries": items,
            "extractedAt": Utc::now().to_rfc3339(),
        });
        self.write_json(self.root.join(ENTRIES_FILE), &document)
    }

    fn save_posts(&self, posts: &[PostRecord]) -> Result<PathBuf> {
        self.write_json(self.root.join(POSTS_FILE), &posts)
    }
}
