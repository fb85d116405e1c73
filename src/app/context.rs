use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::error::{ArchiveError, Result};
use crate::config::Config;
use crate::fetcher::{Crawler, Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;
use crate::store::{FsPageStore, SqliteStore};

const DB_FILE: &str = "xarchive.db";

pub struct AppContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub pages: Arc<FsPageStore>,
    pub store: Arc<SqliteStore>,
    pub normalizer: Normalizer,
}

impl AppContext {
    /// `data_dir` wins over `[crawler] data_dir`, which wins over the platform default.
    pub fn new(config: Config, data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| config.crawler.data_dir.clone()) {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;

        let store = Arc::new(SqliteStore::new(data_dir.join(DB_FILE))?);
        Ok(Self::assemble(config, data_dir, store))
    }

    /// Pages on disk under `data_dir`, posts in an in-memory database.
    pub fn in_memory(config: Config, data_dir: &Path) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::assemble(config, data_dir.to_path_buf(), store))
    }

    fn assemble(config: Config, data_dir: PathBuf, store: Arc<SqliteStore>) -> Self {
        Self {
            pages: Arc::new(FsPageStore::new(&data_dir)),
            config,
            data_dir,
            store,
            normalizer: Normalizer::new(),
        }
    }

    /// HTTP fetcher for the configured account; fails early on missing credentials.
    pub fn fetcher(&self) -> Result<Arc<dyn Fetcher>> {
        let mut missing = self.config.auth.missing();
        if self.config.crawler.user_id.trim().is_empty() {
            missing.insert(0, "user_id");
        }
        if !missing.is_empty() {
            return Err(ArchiveError::Config(format!(
                "missing {} (set them in the [crawler]/[auth] sections of the config file)",
                missing.join(", ")
            )));
        }

        Ok(Arc::new(HttpFetcher::new(
            &self.config.crawler,
            &self.config.auth,
        )?))
    }

    pub fn crawler(&self, fetcher: Arc<dyn Fetcher>) -> Crawler {
        Crawler::new(fetcher, self.normalizer.clone(), &self.config.crawler)
    }

    fn default_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ArchiveError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("xarchive"))
    }
}
