use super::{
    StoreError, SubscribeOutcome, SubscriberStore, UnsubscribeOutcome, WordPoolError,
    WordPoolStore,
};
use crate::domain::{SubscriberEmail, WordPool};
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use std::{collections::BTreeMap, fmt::Display};

type KeyedWords = Json<BTreeMap<String, String>>;

/// A configurable table name. Table names are interpolated into queries, so
/// only plain SQL identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(s: String) -> Result<Self, String> {
        let mut chars = s.chars();
        let starts_well = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_is_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if starts_well && rest_is_valid && s.len() <= 63 {
            Ok(Self(s))
        } else {
            Err(format!("{s} is not a valid table name."))
        }
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscribers stored one row per address, with the address as primary key.
#[derive(Debug, Clone)]
pub struct PgSubscriberStore {
    pool: PgPool,
    table: TableName,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool, table: TableName) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Fetch all subscribers", skip(self))]
    async fn list(&self) -> Result<Vec<SubscriberEmail>, StoreError> {
        let query = format!("SELECT email FROM {} ORDER BY subscribed_at, email", self.table);
        let rows: Vec<(String,)> = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {e:?}");
                e
            })?;

        let subscribers = rows
            .into_iter()
            .filter_map(|(email,)| match SubscriberEmail::parse(email) {
                Ok(email) => Some(email),
                Err(error) => {
                    tracing::warn!(
                        error.message = %error,
                        "Skipping a subscriber. Their stored address is invalid"
                    );
                    None
                }
            })
            .collect();

        Ok(subscribers)
    }

    #[tracing::instrument(name = "Saving new subscriber in database", skip(self))]
    async fn add(&self, email: &SubscriberEmail) -> Result<SubscribeOutcome, StoreError> {
        let query = format!(
            "INSERT INTO {} (email, subscribed_at) VALUES ($1, now()) ON CONFLICT DO NOTHING",
            self.table
        );
        let inserted = sqlx::query(&query)
            .bind(email.as_ref())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {e:?}");
                e
            })?
            .rows_affected();

        if inserted > 0 {
            tracing::info!("New subscriber has been saved");
            Ok(SubscribeOutcome::Created)
        } else {
            Ok(SubscribeOutcome::AlreadyExists)
        }
    }

    #[tracing::instrument(name = "Removing subscriber from database", skip(self))]
    async fn remove(&self, email: &SubscriberEmail) -> Result<UnsubscribeOutcome, StoreError> {
        let query = format!("DELETE FROM {} WHERE email = $1", self.table);
        let deleted = sqlx::query(&query)
            .bind(email.as_ref())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {e:?}");
                e
            })?
            .rows_affected();

        if deleted > 0 {
            Ok(UnsubscribeOutcome::Removed)
        } else {
            Ok(UnsubscribeOutcome::NotFound)
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.pool.acquire().await?;
        Ok(())
    }
}

/// The word pool stored as a single row holding a JSONB object of words.
#[derive(Debug, Clone)]
pub struct PgWordPoolStore {
    pool: PgPool,
    table: TableName,
}

impl PgWordPoolStore {
    pub fn new(pool: PgPool, table: TableName) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl WordPoolStore for PgWordPoolStore {
    /// The pool row stays locked (`FOR UPDATE`) until the reduced pool is
    /// written back, so concurrent campaigns are serialised on it.
    #[tracing::instrument(name = "Consume two words from the pool", skip(self), err)]
    async fn consume_two(&self) -> Result<[String; 2], WordPoolError> {
        let mut transaction = self.pool.begin().await?;

        let select = format!("SELECT id, words FROM {} ORDER BY id LIMIT 1 FOR UPDATE", self.table);
        let (id, Json(keyed)): (i16, KeyedWords) = sqlx::query_as(&select)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or(WordPoolError::Missing)?;

        let mut words = WordPool::from_keyed(keyed);
        let remaining = words.len();
        let selected = words
            .take_two(&mut rand::thread_rng())
            .ok_or(WordPoolError::Exhausted { remaining })?;

        let update = format!("UPDATE {} SET words = $1 WHERE id = $2", self.table);
        sqlx::query(&update)
            .bind(Json(words.to_keyed()))
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        tracing::info!(remaining = words.len(), "Consumed two words from the pool");
        Ok(selected)
    }

    /// The pool row is created first if missing (`ON CONFLICT DO NOTHING`),
    /// so concurrent first replenishes all end up locking the same row.
    #[tracing::instrument(name = "Replenish the word pool", skip(self, words), fields(added = words.len()), err)]
    async fn replenish(&self, words: Vec<String>) -> Result<usize, WordPoolError> {
        let mut transaction = self.pool.begin().await?;

        let insert = format!(
            "INSERT INTO {} (id, words) VALUES (1, '{{}}'::jsonb) ON CONFLICT (id) DO NOTHING",
            self.table
        );
        sqlx::query(&insert).execute(&mut *transaction).await?;

        let select = format!("SELECT id, words FROM {} ORDER BY id LIMIT 1 FOR UPDATE", self.table);
        let (id, Json(keyed)): (i16, KeyedWords) = sqlx::query_as(&select)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or(WordPoolError::Missing)?;

        let mut pool = WordPool::from_keyed(keyed);
        pool.extend(words);
        let update = format!("UPDATE {} SET words = $1 WHERE id = $2", self.table);
        sqlx::query(&update)
            .bind(Json(pool.to_keyed()))
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        Ok(pool.len())
    }

    async fn size(&self) -> Result<Option<usize>, WordPoolError> {
        let select = format!("SELECT words FROM {} ORDER BY id LIMIT 1", self.table);
        let row: Option<(KeyedWords,)> = sqlx::query_as(&select)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(Json(keyed),)| keyed.len()))
    }
}
