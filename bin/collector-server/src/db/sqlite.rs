//! SQLite implementation of [`MessageStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  Migrations are run automatically
//! on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary.  The database file location is determined at
//! runtime by the `COLLECTOR_DATABASE_URL` environment variable and is
//! **not** related to the current working directory at runtime.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that no
//! `DATABASE_URL` environment variable is needed at compile time.
//!
//! Timestamps are stored as RFC 3339 UTC text; in that form lexicographic
//! order matches chronological order, so the `received_at` index sorts
//! correctly.

use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use super::{MessageStore, NewMessage, StoredMessage};

/// SQLite-backed message store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://collector.db"`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Open a fresh in-memory database for tests.
    ///
    /// A pooled `sqlite::memory:` URL gives every pooled connection its own
    /// database, so the pool is pinned to a single long-lived connection.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl MessageStore for SqliteStore {
    async fn insert(&self, message: NewMessage) -> Result<i64, sqlx::Error> {
        let received_at = message.received_at.to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO messages (group_or_user_name, message_content, received_at) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(&message.group_or_user_name)
        .bind(&message.message_content)
        .bind(&received_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<StoredMessage>, sqlx::Error> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, group_or_user_name, message_content, received_at \
             FROM messages WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, group_or_user_name, message_content, received_at)| {
            StoredMessage {
                id,
                group_or_user_name,
                message_content,
                received_at: received_at.parse().unwrap_or_else(|e: chrono::ParseError| {
                    tracing::warn!(raw = %received_at, error = %e, "failed to parse message received_at; using now");
                    Utc::now()
                }),
            }
        }))
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn sample(source: &str, content: &str) -> NewMessage {
        NewMessage {
            group_or_user_name: source.to_owned(),
            message_content: content.to_owned(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = SqliteStore::connect_in_memory().await.expect("store");
        let first = store.insert(sample("WorkGroup", "a")).await.expect("insert");
        let second = store.insert(sample("WorkGroup", "b")).await.expect("insert");
        assert!(first > 0);
        assert!(second > first);
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_all_fields() {
        let store = SqliteStore::connect_in_memory().await.expect("store");
        let message = sample("🚀技术群", "测试中文消息😊，包含各种符号！@#￥%……&*（）——+");
        let id = store.insert(message.clone()).await.expect("insert");

        let stored = store.get(id).await.expect("get").expect("row exists");
        assert_eq!(stored.id, id);
        assert_eq!(stored.group_or_user_name, message.group_or_user_name);
        assert_eq!(stored.message_content, message.message_content);
        assert_eq!(stored.received_at, message.received_at);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let store = SqliteStore::connect_in_memory().await.expect("store");
        assert!(store.get(999).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn count_reflects_inserts() {
        let store = SqliteStore::connect_in_memory().await.expect("store");
        assert_eq!(store.count().await.expect("count"), 0);
        for i in 0..3 {
            store
                .insert(sample("group", &format!("message {i}")))
                .await
                .expect("insert");
        }
        assert_eq!(store.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn concurrent_inserts_yield_distinct_ids() {
        let store = std::sync::Arc::new(SqliteStore::connect_in_memory().await.expect("store"));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let store = std::sync::Arc::clone(&store);
            tasks.spawn(async move {
                store
                    .insert(NewMessage {
                        group_or_user_name: format!("group-{i}"),
                        message_content: format!("message {i}"),
                        received_at: Utc::now(),
                    })
                    .await
                    .expect("insert")
            });
        }

        let mut ids = std::collections::HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            ids.insert(joined.expect("task"));
        }
        assert_eq!(ids.len(), 8);
        assert_eq!(store.count().await.expect("count"), 8);
    }
}
