pub mod crawler;
pub mod http_fetcher;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;

pub use crawler::{CrawlReport, Crawler};
pub use http_fetcher::HttpFetcher;

/// Fetches one page of the timeline. `cursor` is `None` for the first page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Value>;
}
