use super::{
    StoreError, SubscribeOutcome, SubscriberStore, UnsubscribeOutcome, WordPoolError,
    WordPoolStore,
};
use crate::domain::{SubscriberEmail, WordPool};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory [`SubscriberStore`] for development and testing.
///
/// Nothing is persisted, all subscribers are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriberStore {
    subscribers: Arc<Mutex<Vec<SubscriberEmail>>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn list(&self) -> Result<Vec<SubscriberEmail>, StoreError> {
        Ok(self.subscribers.lock().await.clone())
    }

    async fn add(&self, email: &SubscriberEmail) -> Result<SubscribeOutcome, StoreError> {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.contains(email) {
            return Ok(SubscribeOutcome::AlreadyExists);
        }
        subscribers.push(email.clone());
        Ok(SubscribeOutcome::Created)
    }

    async fn remove(&self, email: &SubscriberEmail) -> Result<UnsubscribeOutcome, StoreError> {
        let mut subscribers = self.subscribers.lock().await;
        match subscribers.iter().position(|s| s == email) {
            Some(idx) => {
                subscribers.remove(idx);
                Ok(UnsubscribeOutcome::Removed)
            }
            None => Ok(UnsubscribeOutcome::NotFound),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory [`WordPoolStore`]. A `None` pool behaves like a database
/// without a word pool record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWordPoolStore {
    pool: Arc<Mutex<Option<WordPool>>>,
}

impl InMemoryWordPoolStore {
    /// A store without any word pool record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: Vec<String>) -> Self {
        Self {
            pool: Arc::new(Mutex::new(Some(WordPool::new(words)))),
        }
    }

    /// Snapshot of the words left in the pool.
    pub async fn words(&self) -> Option<Vec<String>> {
        self.pool
            .lock()
            .await
            .as_ref()
            .map(|pool| pool.words().to_vec())
    }
}

#[async_trait]
impl WordPoolStore for InMemoryWordPoolStore {
    async fn consume_two(&self) -> Result<[String; 2], WordPoolError> {
        let mut guard = self.pool.lock().await;
        let pool = guard.as_mut().ok_or(WordPoolError::Missing)?;
        let remaining = pool.len();

        pool.take_two(&mut rand::thread_rng())
            .ok_or(WordPoolError::Exhausted { remaining })
    }

    async fn replenish(&self, words: Vec<String>) -> Result<usize, WordPoolError> {
        let mut guard = self.pool.lock().await;
        let pool = guard.get_or_insert_with(WordPool::default);
        pool.extend(words);
        Ok(pool.len())
    }

    async fn size(&self) -> Result<Option<usize>, WordPoolError> {
        Ok(self.pool.lock().await.as_ref().map(WordPool::len))
    }
}
