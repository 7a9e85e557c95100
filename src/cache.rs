//! Local news cache backed by SQLite.
//!
//! A single background thread owns the [`Connection`] and executes commands
//! in the order they arrive, so every write is serialized: an insert for page
//! N always lands before a later clear-and-insert from a refresh.  The async
//! [`NewsCache`] handle is cheap to clone and only sends commands.
//!
//! Every committed write bumps a version number that can be watched through
//! [`NewsCache::subscribe`]; the UI uses it to know when to reload its list.

use std::path::Path;

use rusqlite::{params, Connection};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::error::CacheError;
use crate::source::NewsItem;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS news (
    id          TEXT PRIMARY KEY NOT NULL,
    image       TEXT,
    chapeu      TEXT,
    title       TEXT,
    summary     TEXT,
    url         TEXT,
    publication INTEGER
);

CREATE INDEX IF NOT EXISTS idx_news_publication
    ON news(publication DESC);
";

const UPSERT: &str = "INSERT OR REPLACE INTO news (id, image, chapeu, title, summary, url, publication)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

type Reply<T> = oneshot::Sender<Result<T, CacheError>>;

enum CacheCmd {
    Insert {
        items: Vec<NewsItem>,
        reply: Reply<()>,
    },
    Clear {
        reply: Reply<()>,
    },
    Replace {
        items: Vec<NewsItem>,
        reply: Reply<()>,
    },
    LoadPage {
        limit: usize,
        offset: usize,
        reply: Reply<Vec<NewsItem>>,
    },
    Count {
        reply: Reply<usize>,
    },
}

// ---------------------------------------------------------------------------
// NewsCache: Clone + Send + Sync async facade
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct NewsCache {
    tx: mpsc::UnboundedSender<CacheCmd>,
    changes: watch::Receiver<u64>,
}

impl NewsCache {
    /// Open (or create) the cache database at `path` and spawn its thread.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let conn = Connection::open(path.as_ref())?;
        Self::start(conn)
    }

    /// A throwaway cache, used by tests.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::start(Connection::open_in_memory()?)
    }

    fn start(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(SCHEMA)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (changes_tx, changes) = watch::channel(0);

        std::thread::Builder::new()
            .name("news-cache".into())
            .spawn(move || Self::run_loop(conn, rx, changes_tx))?;

        Ok(Self { tx, changes })
    }

    /// Version counter bumped after every committed write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.clone()
    }

    // -- async methods -------------------------------------------------------

    /// Insert or replace `items`, keyed by id, in one transaction.
    pub async fn insert(&self, items: Vec<NewsItem>) -> Result<(), CacheError> {
        self.request(|reply| CacheCmd::Insert { items, reply }).await
    }

    /// Delete every row.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.request(|reply| CacheCmd::Clear { reply }).await
    }

    /// Atomically swap the whole cache for `items`.
    pub async fn replace_all(&self, items: Vec<NewsItem>) -> Result<(), CacheError> {
        self.request(|reply| CacheCmd::Replace { items, reply }).await
    }

    /// Read `limit` rows starting at `offset`, newest first, undated last.
    pub async fn load_page(&self, limit: usize, offset: usize) -> Result<Vec<NewsItem>, CacheError> {
        self.request(|reply| CacheCmd::LoadPage {
            limit,
            offset,
            reply,
        })
        .await
    }

    pub async fn count(&self) -> Result<usize, CacheError> {
        self.request(|reply| CacheCmd::Count { reply }).await
    }

    async fn request<T>(&self, cmd: impl FnOnce(Reply<T>) -> CacheCmd) -> Result<T, CacheError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(cmd(reply))
            .map_err(|_| CacheError::Unavailable)?;
        rx.await.map_err(|_| CacheError::Unavailable)?
    }

    // -- background thread ---------------------------------------------------

    fn run_loop(
        conn: Connection,
        mut rx: mpsc::UnboundedReceiver<CacheCmd>,
        changes: watch::Sender<u64>,
    ) {
        let bump = |result: &Result<(), CacheError>| {
            if result.is_ok() {
                changes.send_modify(|version| *version += 1);
            }
        };

        while let Some(cmd) = rx.blocking_recv() {
            match cmd {
                CacheCmd::Insert { items, reply } => {
                    let result = Self::do_insert(&conn, &items, false);
                    bump(&result);
                    let _ = reply.send(result);
                }
                CacheCmd::Clear { reply } => {
                    let result = Self::do_clear(&conn);
                    bump(&result);
                    let _ = reply.send(result);
                }
                CacheCmd::Replace { items, reply } => {
                    let result = Self::do_insert(&conn, &items, true);
                    bump(&result);
                    let _ = reply.send(result);
                }
                CacheCmd::LoadPage {
                    limit,
                    offset,
                    reply,
                } => {
                    let _ = reply.send(Self::do_load_page(&conn, limit, offset));
                }
                CacheCmd::Count { reply } => {
                    let _ = reply.send(Self::do_count(&conn));
                }
            }
        }
        debug!("cache thread exiting");
    }

    // -- synchronous DB operations -------------------------------------------

    fn do_insert(conn: &Connection, items: &[NewsItem], replace: bool) -> Result<(), CacheError> {
        let tx = conn.unchecked_transaction()?;

        if replace {
            tx.execute("DELETE FROM news", [])?;
        }

        {
            let mut stmt = tx.prepare(UPSERT)?;
            for item in items {
                stmt.execute(params![
                    item.id,
                    item.image,
                    item.chapeu,
                    item.title,
                    item.summary,
                    item.url,
                    item.publication,
                ])?;
            }
        }

        tx.commit()?;
        debug!(count = items.len(), replace, "news cached");
        Ok(())
    }

    fn do_clear(conn: &Connection) -> Result<(), CacheError> {
        let removed = conn.execute("DELETE FROM news", [])?;
        debug!(removed, "news cache cleared");
        Ok(())
    }

    fn do_load_page(conn: &Connection, limit: usize, offset: usize) -> Result<Vec<NewsItem>, CacheError> {
        let mut stmt = conn.prepare(
            "SELECT id, image, chapeu, title, summary, url, publication
             FROM news
             ORDER BY publication IS NULL, publication DESC, id ASC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(NewsItem {
                id: row.get(0)?,
                image: row.get(1)?,
                chapeu: row.get(2)?,
                title: row.get(3)?,
                summary: row.get(4)?,
                url: row.get(5)?,
                publication: row.get(6)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn do_count(conn: &Connection) -> Result<usize, CacheError> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
