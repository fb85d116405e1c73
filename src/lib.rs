//! # xarchive
//!
//! Archives a user's timeline from the GraphQL `UserTweets` endpoint and
//! turns the raw pages into a flat, render-ready feed.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → pages/page_NNN.json → Normalizer → Transformer → Store → UI
//! ```
//!
//! - [`fetcher`]: authenticated page requests and the cursor-following crawler
//! - [`normalizer`]: flattens timeline instructions into leaf post entries and
//!   transforms post nodes into [`PostRecord`](domain::PostRecord)s
//! - [`store`]: page files on disk and the SQLite post archive
//! - [`tui`]: infinite-scroll feed viewer built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Crawl and extract in one go
//! xarchive run
//!
//! # Page through the archive
//! xarchive list --page 2
//!
//! # Browse it
//! xarchive tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the page store,
/// post store, normalizer and configuration.
pub mod app;

/// Configuration loaded from `~/.config/xarchive/config.toml`:
/// crawler limits, session credentials, colors and keybindings.
pub mod config;

/// Command-line interface using clap.
///
/// - `crawl` - Fetch timeline pages
/// - `extract` - Flatten saved pages into entries, posts and the database
/// - `run` - Crawl, then extract
/// - `list` / `show` - Inspect the archive
/// - `tui` - Launch the TUI
pub mod cli;

/// The render-ready [`PostRecord`](domain::PostRecord).
pub mod domain;

/// Timeline fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`Crawler`](fetcher::Crawler): Sequential cursor-following loop
pub mod fetcher;

/// Entry normalization and post transformation. Pure and synchronous.
pub mod normalizer;

/// Persistence.
///
/// - [`PageStore`](store::PageStore) / [`FsPageStore`](store::FsPageStore): raw pages and JSON artifacts
/// - [`PostStore`](store::PostStore) / [`SqliteStore`](store::SqliteStore): the post archive
pub mod store;

/// Terminal user interface: posts list, preview pane and status bar.
pub mod tui;
