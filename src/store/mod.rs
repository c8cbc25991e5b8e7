//! Persistence for subscribers and the word pool.
//!
//! Both stores are traits so the application can be wired against Postgres in
//! production and against the in-memory implementations in tests.

mod memory;
mod postgres;

pub use memory::{InMemorySubscriberStore, InMemoryWordPoolStore};
pub use postgres::{PgSubscriberStore, PgWordPoolStore, TableName};

use crate::domain::SubscriberEmail;
use async_trait::async_trait;

/// Result of adding an address to the subscriber store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Created,
    AlreadyExists,
}

/// Result of removing an address from the subscriber store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotFound,
}

#[async_trait]
pub trait SubscriberStore: Send + Sync + 'static {
    /// All current subscribers in the order they subscribed.
    async fn list(&self) -> Result<Vec<SubscriberEmail>, StoreError>;

    /// Insert the address unless it is already subscribed.
    async fn add(&self, email: &SubscriberEmail) -> Result<SubscribeOutcome, StoreError>;

    async fn remove(&self, email: &SubscriberEmail) -> Result<UnsubscribeOutcome, StoreError>;

    /// Check that the backing storage can be reached.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait WordPoolStore: Send + Sync + 'static {
    /// Atomically remove two distinct random words from the pool and return
    /// them. Concurrent callers never receive the same word.
    async fn consume_two(&self) -> Result<[String; 2], WordPoolError>;

    /// Append words to the pool, creating it if it does not exist yet.
    /// Returns the size of the pool afterwards.
    async fn replenish(&self, words: Vec<String>) -> Result<usize, WordPoolError>;

    /// Number of words left, or `None` if there is no pool at all.
    async fn size(&self) -> Result<Option<usize>, WordPoolError>;
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to reach the database")]
    Database(#[from] sqlx::Error),
}

#[derive(thiserror::Error)]
pub enum WordPoolError {
    #[error("No words available: the word pool does not exist")]
    Missing,
    #[error("The word pool is exhausted, {remaining} word(s) left")]
    Exhausted { remaining: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for WordPoolError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(e))
    }
}
