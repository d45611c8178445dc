//! Database abstraction layer.
//!
//! [`MessageStore`] defines the interface for persisting accepted messages.
//! The default implementation is [`sqlite::SqliteStore`].  To swap to another
//! database (Postgres, MySQL, …), implement [`MessageStore`] for your new
//! type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod sqlite;

use chrono::{DateTime, Utc};

/// A message accepted for persistence; no id has been assigned yet.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Name of the chat group or user the message came from.
    pub group_or_user_name: String,
    /// Full message text, unbounded.
    pub message_content: String,
    /// Timestamp at which the client received the message.
    pub received_at: DateTime<Utc>,
}

/// A single row in the `messages` table.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    /// Engine-assigned id; unique and increasing, never reused.
    pub id: i64,
    pub group_or_user_name: String,
    pub message_content: String,
    pub received_at: DateTime<Utc>,
}

/// Trait for persisting chat messages.
///
/// Implement this trait to swap SQLite for another database backend without
/// touching any handler code.
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a new message atomically and return its generated id.
    fn insert(
        &self,
        message: NewMessage,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Retrieve a single message by id.
    ///
    /// Not exposed over HTTP; used by tests and operational tooling.
    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<StoredMessage>, sqlx::Error>> + Send;

    /// Total number of persisted messages.
    fn count(&self) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;
}
