pub mod pages;
pub mod sqlite;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::app::Result;
use crate::domain::PostRecord;
use crate::normalizer::TimelineItem;

pub use pages::FsPageStore;
pub use sqlite::SqliteStore;

/// Raw pages and the extraction artifacts written next to them.
pub trait PageStore: Send + Sync {
    /// Persist page `page` (1-based) and return where it was written.
    fn save_page(&self, page: usize, document: &Value) -> Result<PathBuf>;
    /// Saved page files in fetch order.
    fn list_pages(&self) -> Result<Vec<PathBuf>>;
    /// Remove every saved page file. Returns how many were removed.
    fn clear_pages(&self) -> Result<usize>;
    fn load_page(&self, path: &Path) -> Result<Value>;
    fn save_entries(&self, items: &[TimelineItem]) -> Result<PathBuf>;
    fn save_posts(&self, posts: &[PostRecord]) -> Result<PathBuf>;
}

pub trait PostStore: Send + Sync {
    /// Replace the archive with `posts`, keeping the first occurrence of each id.
    fn replace_posts(&self, posts: &[PostRecord]) -> Result<usize>;
    /// Page `page` (1-based) of `page_size` posts in timeline order.
    fn get_posts(&self, page: usize, page_size: usize) -> Result<Vec<PostRecord>>;
    fn get_post(&self, id: &str) -> Result<Option<PostRecord>>;
    fn count_posts(&self) -> Result<usize>;
}
