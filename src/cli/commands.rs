use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::{AppContext, ArchiveError, Result};
use crate::fetcher::{CrawlReport, Fetcher};
use crate::store::{PageStore, PostStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Page files that contributed at least one entry.
    pub processed_files: usize,
    /// Page files that were unreadable or held no entries.
    pub empty_files: usize,
    pub entries: usize,
    pub posts: usize,
    pub duration: Duration,
}

pub async fn crawl(
    ctx: &AppContext,
    max_posts: Option<usize>,
    delay_ms: Option<u64>,
) -> Result<CrawlReport> {
    let fetcher = ctx.fetcher()?;
    crawl_with(ctx, fetcher, max_posts, delay_ms).await
}

pub async fn crawl_with(
    ctx: &AppContext,
    fetcher: Arc<dyn Fetcher>,
    max_posts: Option<usize>,
    delay_ms: Option<u64>,
) -> Result<CrawlReport> {
    let max_posts = max_posts.unwrap_or(ctx.config.crawler.max_posts);
    let delay = delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| ctx.config.crawler.delay());

    println!(
        "Crawling up to {} posts into {}",
        max_posts,
        ctx.pages.pages_dir().display()
    );

    let report = ctx
        .crawler(fetcher)
        .with_limits(max_posts, delay)
        .crawl(ctx.pages.as_ref())
        .await?;

    println!(
        "Fetched {} pages ({} posts) in {:.2}s",
        report.pages,
        report.posts,
        report.duration.as_secs_f64()
    );
    Ok(report)
}

pub fn extract(ctx: &AppContext) -> Result<ExtractReport> {
    let started = Instant::now();
    let mut report = ExtractReport::default();

    let files = ctx.pages.list_pages()?;
    if files.is_empty() {
        println!("No page files found in {}", ctx.pages.pages_dir().display());
        return Ok(report);
    }
    println!("Found {} page files", files.len());

    let mut items = Vec::new();
    for path in &files {
        let page_items = match ctx.pages.load_page(path) {
            Ok(document) => ctx.normalizer.normalize_document(&document),
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Failed to load page");
                Vec::new()
            }
        };

        if page_items.is_empty() {
            report.empty_files += 1;
            tracing::warn!(file = %path.display(), "No entries extracted");
        } else {
            report.processed_files += 1;
            tracing::info!(file = %path.display(), entries = page_items.len(), "Extracted entries");
        }
        items.extend(page_items);
    }

    report.entries = items.len();
    if items.is_empty() {
        println!(
            "No entries extracted from {} files, archive left unchanged",
            files.len()
        );
        report.duration = started.elapsed();
        return Ok(report);
    }
    ctx.pages.save_entries(&items)?;

    let posts = ctx.normalizer.posts(&items);
    ctx.pages.save_posts(&posts)?;
    report.posts = ctx.store.replace_posts(&posts)?;
    report.duration = started.elapsed();

    println!(
        "Extracted {} entries and {} posts from {} files ({} empty) in {:.2}s",
        report.entries,
        report.posts,
        report.processed_files,
        report.empty_files,
        report.duration.as_secs_f64()
    );
    Ok(report)
}

pub async fn run(ctx: &AppContext, max_posts: Option<usize>, delay_ms: Option<u64>) -> Result<()> {
    let started = Instant::now();

    println!("Step 1/2: crawl");
    let crawled = crawl(ctx, max_posts, delay_ms).await?;

    println!("Step 2/2: extract");
    let extracted = extract(ctx)?;
    if extracted.entries == 0 {
        return Err(ArchiveError::Other("no entries extracted".into()));
    }

    println!();
    println!("Pages fetched:     {}", crawled.pages);
    println!("Posts fetched:     {}", crawled.posts);
    println!("Entries extracted: {}", extracted.entries);
    println!("Posts archived:    {}", extracted.posts);
    println!("Total time:        {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

pub fn list_posts(ctx: &AppContext, page: usize, page_size: usize) -> Result<()> {
    let total = ctx.store.count_posts()?;
    if total == 0 {
        println!("No posts archived. Run `xarchive run` first.");
        return Ok(());
    }

    let page = page.max(1);
    let pages = total.div_ceil(page_size.max(1));
    let posts = ctx.store.get_posts(page, page_size)?;

    println!("Page {}/{} ({} posts)", page, pages, total);
    println!("{}", "-".repeat(60));
    for post in posts {
        let when = post
            .posted_at()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let text: String = post.display_text().replace('\n', " ").chars().take(80).collect();

        println!("{}  {}  {}", post.id, when, post.user.at_handle());
        println!("  {}", text);
        if let Some(quoted) = &post.quoted_tweet {
            println!("  > {}: {}", quoted.user.at_handle(), quoted.id);
        }
    }
    Ok(())
}

pub fn show_post(ctx: &AppContext, id: &str) -> Result<()> {
    let post = ctx
        .store
        .get_post(id)?
        .ok_or_else(|| ArchiveError::PostNotFound(id.to_string()))?;

    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}
