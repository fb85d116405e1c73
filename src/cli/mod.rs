pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Parser)]
#[command(name = "xarchive")]
#[command(about = "Archive a user timeline and browse it offline", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/xarchive/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding pages, entries.json, posts.json and the database
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch timeline pages and save them as page_NNN.json
    Crawl {
        /// Stop after this many posts (default: from config)
        #[arg(long)]
        max_posts: Option<usize>,

        /// Pause between requests in milliseconds (default: from config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Flatten saved pages into entries.json, posts.json and the database
    Extract,
    /// Crawl, then extract
    Run {
        #[arg(long)]
        max_posts: Option<usize>,

        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// List archived posts
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Print one archived post as JSON
    Show {
        /// Post id
        id: String,
    },
    /// Browse the archive in the terminal
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl_overrides() {
        let cli = Cli::parse_from(["xarchive", "crawl", "--max-posts", "50", "--delay-ms", "0"]);
        match cli.command {
            Commands::Crawl {
                max_posts,
                delay_ms,
            } => {
                assert_eq!(max_posts, Some(50));
                assert_eq!(delay_ms, Some(0));
            }
            _ => panic!("expected crawl"),
        }
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli = Cli::parse_from(["xarchive", "list", "--data-dir", "/tmp/archive", "-p", "3"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/archive")));
        match cli.command {
            Commands::List { page, page_size } => {
                assert_eq!(page, 3);
                assert_eq!(page_size, DEFAULT_PAGE_SIZE);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_show_requires_id() {
        assert!(Cli::try_parse_from(["xarchive", "show"]).is_err());
    }
}
