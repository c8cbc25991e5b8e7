//! Store tests against a real database. They need a Postgres instance
//! reachable through `DATABASE_URL` and run with `cargo test -- --ignored`.

use claims::{assert_matches, assert_ok};
use daily_words::{
    domain::SubscriberEmail,
    store::{
        PgSubscriberStore, PgWordPoolStore, SubscribeOutcome, SubscriberStore, TableName,
        UnsubscribeOutcome, WordPoolError, WordPoolStore,
    },
};
use pretty_assertions::assert_eq;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sqlx::{Executor, PgPool};

/// Connect to the test database and create fresh, uniquely named tables for
/// one test.
async fn configure_database() -> (PgPool, TableName, TableName) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    let suffix: String = thread_rng()
        .sample_iter(Alphanumeric)
        .map(char::from)
        .filter(char::is_ascii_lowercase)
        .take(12)
        .collect();
    let subscribers = format!("subscribers_{suffix}");
    let word_pool = format!("word_pool_{suffix}");

    pool.execute(
        format!(
            r#"CREATE TABLE {subscribers}(
                email TEXT NOT NULL PRIMARY KEY,
                subscribed_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE TABLE {word_pool}(
                id SMALLINT NOT NULL PRIMARY KEY,
                words JSONB NOT NULL DEFAULT '{{}}'::jsonb
            );"#
        )
        .as_str(),
    )
    .await
    .expect("Failed to create tables");

    (
        pool,
        TableName::parse(subscribers).unwrap(),
        TableName::parse(word_pool).unwrap(),
    )
}

fn email(s: &str) -> SubscriberEmail {
    SubscriberEmail::parse(s.to_string()).unwrap()
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn subscribers_are_unique_and_removable() {
    let (pool, subscribers, _) = configure_database().await;
    let store = PgSubscriberStore::new(pool, subscribers);

    assert_eq!(
        assert_ok!(store.add(&email("a@x.com")).await),
        SubscribeOutcome::Created
    );
    assert_eq!(
        assert_ok!(store.add(&email("a@x.com")).await),
        SubscribeOutcome::AlreadyExists
    );
    assert_eq!(assert_ok!(store.list().await), vec![email("a@x.com")]);

    assert_eq!(
        assert_ok!(store.remove(&email("b@x.com")).await),
        UnsubscribeOutcome::NotFound
    );
    assert_eq!(
        assert_ok!(store.remove(&email("a@x.com")).await),
        UnsubscribeOutcome::Removed
    );
    assert!(assert_ok!(store.list().await).is_empty());
    assert_ok!(store.ping().await);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn word_pool_is_consumed_until_exhausted() {
    let (pool, _, word_pool) = configure_database().await;
    let store = PgWordPoolStore::new(pool, word_pool);

    assert_matches!(store.consume_two().await, Err(WordPoolError::Missing));

    assert_eq!(
        assert_ok!(store.replenish(vec!["lucid".into(), "terse".into()]).await),
        2
    );
    let mut words = assert_ok!(store.consume_two().await).to_vec();
    words.sort();
    assert_eq!(words, vec!["lucid", "terse"]);
    assert_eq!(assert_ok!(store.size().await), Some(0));

    assert_matches!(
        store.consume_two().await,
        Err(WordPoolError::Exhausted { remaining: 0 })
    );
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn concurrent_consumers_never_share_a_word() {
    let (pool, _, word_pool) = configure_database().await;
    let store = PgWordPoolStore::new(pool, word_pool);
    let words: Vec<String> = (0..20).map(|i| format!("word{i}")).collect();
    store.replenish(words).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.consume_two().await })
        })
        .collect();

    let mut seen = Vec::new();
    for handle in handles {
        seen.extend(handle.await.unwrap().unwrap());
    }
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), 20);
    assert_eq!(store.size().await.unwrap(), Some(0));
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn concurrent_first_replenishes_all_land_in_one_pool() {
    let (pool, _, word_pool) = configure_database().await;
    let store = PgWordPoolStore::new(pool, word_pool);

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .replenish(vec![format!("first{i}"), format!("second{i}")])
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    assert_eq!(store.size().await.unwrap(), Some(10));
}
