use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::Result;
use crate::config::CrawlerConfig;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::store::PageStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages: usize,
    pub posts: usize,
    pub duration: Duration,
}

/// Walks the timeline one page at a time, following the bottom cursor.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    normalizer: Normalizer,
    max_posts: usize,
    delay: Duration,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, normalizer: Normalizer, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            normalizer,
            max_posts: config.max_posts,
            delay: config.delay(),
        }
    }

    pub fn with_limits(mut self, max_posts: usize, delay: Duration) -> Self {
        self.max_posts = max_posts;
        self.delay = delay;
        self
    }

    /// Fetch and save pages until `max_posts` is reached, a page comes back
    /// empty, or the timeline has no further bottom cursor.
    pub async fn crawl(&self, pages: &dyn PageStore) -> Result<CrawlReport> {
        let started = Instant::now();
        let mut report = CrawlReport::default();
        let mut cursor: Option<String> = None;

        tracing::info!(max_posts = self.max_posts, "Starting crawl");

        while report.posts < self.max_posts {
            let document = self.fetcher.fetch_page(cursor.as_deref()).await?;
            report.pages += 1;

            // Pages left by an earlier, longer crawl would be extracted as if fetched now.
            if report.pages == 1 {
                let stale = pages.clear_pages()?;
                if stale > 0 {
                    tracing::warn!(removed = stale, "Removed page files from a previous crawl");
                }
            }

            let path = pages.save_page(report.pages, &document)?;
            let summary = self.normalizer.summarize(&document);
            report.posts += summary.posts;

            tracing::info!(
                page = report.pages,
                posts = summary.posts,
                total = report.posts,
                file = %path.display(),
                "Saved page"
            );

            if summary.entries == 0 {
                tracing::warn!(page = report.pages, "Page has no entries, stopping");
                break;
            }

            let next = match summary.bottom_cursor {
                Some(next) => next,
                None => {
                    tracing::warn!(page = report.pages, "No bottom cursor, reached the end");
                    break;
                }
            };
            if cursor.as_deref() == Some(next.as_str()) {
                tracing::warn!(page = report.pages, "Bottom cursor did not advance, stopping");
                break;
            }
            cursor = Some(next);

            if report.posts < self.max_posts && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        report.duration = started.elapsed();
        tracing::info!(
            pages = report.pages,
            posts = report.posts,
            elapsed_ms = report.duration.as_millis() as u64,
            "Crawl finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ArchiveError;
    use crate::store::FsPageStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves canned pages and records the cursor of every request.
    struct ScriptedFetcher {
        pages: Mutex<VecDeque<Result<Value>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages.into()),
                cursors: Mutex::new(Vec::new()),
            })
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch_page(&self, cursor: Option<&str>) -> Result<Value> {
            self.cursors.lock().unwrap().push(cursor.map(String::from));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ArchiveError::Other("script exhausted".into())))
        }
    }

    fn timeline_page(first_id: usize, count: usize, bottom: Option<&str>) -> Value {
        let mut entries: Vec<Value> = (first_id..first_id + count)
            .map(|id| {
                json!({
                    "entryId": format!("tweet-{}", id),
                    "content": {
                        "entryType": "TimelineTimelineItem",
                        "itemContent": {
                            "itemType": "TimelineTweet",
                            "tweet_results": { "result": {
                                "rest_id": id.to_string(),
                                "legacy": { "full_text": "hi" }
                            }}
                        }
                    }
                })
            })
            .collect();
        if let Some(value) = bottom {
            entries.push(json!({
                "entryId": "cursor-bottom-0",
                "content": {
                    "entryType": "TimelineTimelineCursor",
                    "cursorType": "Bottom",
                    "value": value
                }
            }));
        }
        json!({ "data": { "user": { "result": { "timeline": { "timeline": {
            "instructions": [{ "type": "TimelineAddEntries", "entries": entries }]
        }}}}}})
    }

    fn crawler(fetcher: Arc<ScriptedFetcher>, max_posts: usize) -> Crawler {
        Crawler::new(fetcher, Normalizer::new(), &CrawlerConfig::default())
            .with_limits(max_posts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_follows_cursor_until_timeline_ends() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![
            Ok(timeline_page(1, 3, Some("ABC"))),
            Ok(timeline_page(4, 2, None)),
        ]);

        let report = crawler(fetcher.clone(), 100).crawl(&pages).await.unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.posts, 5);
        assert_eq!(fetcher.cursors(), [None, Some("ABC".to_string())]);
        assert_eq!(pages.list_pages().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_at_max_posts() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![
            Ok(timeline_page(1, 3, Some("A"))),
            Ok(timeline_page(4, 3, Some("B"))),
            Ok(timeline_page(7, 3, Some("C"))),
        ]);

        let report = crawler(fetcher.clone(), 5).crawl(&pages).await.unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.posts, 6);
        assert_eq!(fetcher.cursors().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![
            Ok(timeline_page(1, 2, Some("A"))),
            Ok(timeline_page(0, 0, Some("B"))),
        ]);

        let report = crawler(fetcher, 100).crawl(&pages).await.unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.posts, 2);
    }

    #[tokio::test]
    async fn test_stops_when_cursor_repeats() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![
            Ok(timeline_page(1, 1, Some("SAME"))),
            Ok(timeline_page(2, 1, Some("SAME"))),
        ]);

        let report = crawler(fetcher, 100).crawl(&pages).await.unwrap();
        assert_eq!(report.pages, 2);
    }

    #[tokio::test]
    async fn test_previous_pages_are_replaced() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        for page in 1..=3 {
            pages.save_page(page, &timeline_page(100, 1, None)).unwrap();
        }
        let fetcher = ScriptedFetcher::new(vec![Ok(timeline_page(1, 2, None))]);

        let report = crawler(fetcher, 100).crawl(&pages).await.unwrap();

        assert_eq!(report.pages, 1);
        let saved = pages.list_pages().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].ends_with("page_001.json"));
        assert!(!pages.pages_dir().join("page_003.json").exists());
    }

    #[tokio::test]
    async fn test_failed_first_request_keeps_previous_pages() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        pages.save_page(1, &timeline_page(100, 1, None)).unwrap();
        pages.save_page(2, &timeline_page(101, 1, None)).unwrap();
        let fetcher = ScriptedFetcher::new(vec![Err(ArchiveError::Api("Unauthorized".into()))]);

        assert!(crawler(fetcher, 100).crawl(&pages).await.is_err());
        assert_eq!(pages.list_pages().unwrap().len(), 2);
    }

    #[test]
    fn test_fetch_error_aborts_crawl() {
        let dir = TempDir::new().unwrap();
        let pages = FsPageStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![
            Ok(timeline_page(1, 2, Some("A"))),
            Err(ArchiveError::Api("Rate limit exceeded".into())),
        ]);

        let result = tokio_test::block_on(crawler(fetcher, 100).crawl(&pages));

        assert!(matches!(result, Err(ArchiveError::Api(_))));
        assert_eq!(pages.list_pages().unwrap().len(), 1);
    }
}
