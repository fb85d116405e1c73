use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{ArchiveError, Result};
use crate::domain::PostRecord;
use crate::store::PostStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| ArchiveError::Other(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ArchiveError::Other(format!("database lock poisoned: {}", e)))
    }

    fn decode(payload: String) -> rusqlite::Result<PostRecord> {
        serde_json::from_str(&payload).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
    }
}

impl PostStore for SqliteStore {
    fn replace_posts(&self, posts: &[PostRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM posts", [])?;

        let imported_at = Utc::now().to_rfc3339();
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO posts
                 (position, id, screen_name, created_at, text, payload, imported_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, post) in posts.iter().enumerate() {
                let payload = serde_json::to_string(post)?;
                let changed = stmt.execute(params![
                    position as i64,
                    post.id,
                    post.user.screen_name,
                    post.created_at,
                    post.text,
                    payload,
                    imported_at,
                ])?;
                if changed == 0 {
                    tracing::debug!(id = %post.id, "Skipping duplicate post");
                }
                inserted += changed;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn get_posts(&self, page: usize, page_size: usize) -> Result<Vec<PostRecord>> {
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT payload FROM posts ORDER BY position LIMIT ?1 OFFSET ?2")?;

        let posts = stmt
            .query_map(params![page_size as i64, offset as i64], |row| {
                Self::decode(row.get(0)?)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    fn get_post(&self, id: &str) -> Result<Option<PostRecord>> {
        let conn = self.conn()?;
        let post = conn
            .query_row(
                "SELECT payload FROM posts WHERE id = ?1",
                params![id],
                |row| Self::decode(row.get(0)?),
            )
            .optional()?;

        Ok(post)
    }

    fn count_posts(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Author;

    fn post(id: &str, text: &str) -> PostRecord {
        PostRecord {
            id: id.into(),
            text: text.into(),
            full_text: text.into(),
            user: Author {
                name: "Jane".into(),
                screen_name: "jane".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn numbered(n: usize) -> Vec<PostRecord> {
        (1..=n).map(|i| post(&i.to_string(), "body")).collect()
    }

    #[test]
    fn test_replace_and_get_post() {
        let store = SqliteStore::in_memory().unwrap();
        let mut quoted = post("1", "outer");
        quoted.quoted_tweet = Some(Box::new(post("9", "inner")));

        assert_eq!(store.replace_posts(&[quoted.clone()]).unwrap(), 1);

        let retrieved = store.get_post("1").unwrap().unwrap();
        assert_eq!(retrieved, quoted);
        assert!(store.get_post("404").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let store = SqliteStore::in_memory().unwrap();
        let posts = vec![post("1", "first"), post("2", "second"), post("1", "again")];

        assert_eq!(store.replace_posts(&posts).unwrap(), 2);
        assert_eq!(store.count_posts().unwrap(), 2);
        assert_eq!(store.get_post("1").unwrap().unwrap().text, "first");
    }

    #[test]
    fn test_replace_clears_previous_import() {
        let store = SqliteStore::in_memory().unwrap();
        store.replace_posts(&numbered(5)).unwrap();
        store.replace_posts(&[post("42", "only")]).unwrap();

        assert_eq!(store.count_posts().unwrap(), 1);
        assert!(store.get_post("1").unwrap().is_none());
    }

    #[test]
    fn test_paging_keeps_timeline_order() {
        let store = SqliteStore::in_memory().unwrap();
        store.replace_posts(&numbered(45)).unwrap();

        let ids = |page| -> Vec<String> {
            store
                .get_posts(page, 20)
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect()
        };

        assert_eq!(ids(1).len(), 20);
        assert_eq!(ids(1)[0], "1");
        assert_eq!(ids(2)[0], "21");
        assert_eq!(ids(3), ["41", "42", "43", "44", "45"]);
        assert!(ids(4).is_empty());
        // Page 0 is treated as the first page.
        assert_eq!(ids(0), ids(1));
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("xarchive.db");
        SqliteStore::new(&path)
            .unwrap()
            .replace_posts(&numbered(3))
            .unwrap();

        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(reopened.count_posts().unwrap(), 3);
    }
}
