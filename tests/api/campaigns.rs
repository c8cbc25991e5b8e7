use crate::utils::{
    completion, spawn_app, spawn_app_with_words, when_generating, EchoDefinitions,
    UNSUBSCRIBE_URL,
};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn campaign_consumes_two_words_and_mails_every_subscriber() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse", "opaque", "wry"]).await;
    app.add_subscribers(&["a@x.com", "b@x.com"]).await;

    when_generating()
        .respond_with(EchoDefinitions)
        .expect(1)
        .mount(&app.generation_server)
        .await;

    // Act
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = response.json().await.unwrap();
    let consumed: Vec<String> = serde_json::from_value(report["words"].clone()).unwrap();
    assert_eq!(consumed.len(), 2);
    assert_ne!(consumed[0], consumed[1]);
    assert_eq!(report["recipients"], json!(2));
    assert_eq!(report["delivered"], json!(["a@x.com", "b@x.com"]));
    assert_eq!(report["failed"], json!([]));

    assert_eq!(app.mailer.recipients(), vec!["a@x.com", "b@x.com"]);

    let remaining = app.word_pool.words().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|w| !consumed.contains(w)));
    // Mock verifies on Drop that the generation service was called once.
}

#[tokio::test]
async fn every_subscriber_receives_the_same_rendered_email() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse"]).await;
    app.add_subscribers(&["a@x.com", "b@x.com"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .mount(&app.generation_server)
        .await;

    // Act
    app.post_campaign().await;

    // Assert
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    let (_, email) = &sent[0];
    assert_eq!(&sent[1].1, email);
    assert_eq!(email.subject, "Today's words ✨");
    assert!(email.html_body.contains("the meaning of lucid"));
    assert!(email.html_body.contains("the meaning of terse"));
    assert!(email.html_body.contains(UNSUBSCRIBE_URL));
    assert!(email.text_body.contains("An example using terse."));
}

#[tokio::test]
async fn a_failing_recipient_does_not_stop_the_campaign() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse"]).await;
    app.add_subscribers(&["a@x.com", "b@x.com", "c@x.com"]).await;
    app.mailer.fail_for("a@x.com");
    when_generating()
        .respond_with(EchoDefinitions)
        .mount(&app.generation_server)
        .await;

    // Act
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["delivered"], json!(["b@x.com", "c@x.com"]));
    assert_eq!(report["failed"][0]["address"], json!("a@x.com"));
    assert_eq!(app.mailer.recipients(), vec!["a@x.com", "b@x.com", "c@x.com"]);
}

#[tokio::test]
async fn campaign_without_subscribers_sends_nothing() {
    let app = spawn_app_with_words(&["lucid", "terse", "wry"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .expect(1)
        .mount(&app.generation_server)
        .await;

    let response = app.post_campaign().await;

    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["recipients"], json!(0));
    assert!(app.mailer.sent().is_empty());
    assert_eq!(app.word_pool.words().await.map(|w| w.len()), Some(1));
}

#[tokio::test]
async fn a_malformed_generation_reply_aborts_the_campaign() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse", "wry"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(completion("__import__('os').system('echo pwned')"))
        .expect(1)
        .mount(&app.generation_server)
        .await;

    // Act
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.text().await.unwrap();
    assert!(message.contains("Failed to generate the words' definitions"));
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn a_failing_generation_service_aborts_the_campaign() {
    let app = spawn_app_with_words(&["lucid", "terse"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(wiremock::ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.generation_server)
        .await;

    let response = app.post_campaign().await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn a_reply_for_other_words_aborts_the_campaign() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    let reply = json!([
        { "word": "banana", "definition": "a yellow fruit", "example": "A ripe banana." },
        { "word": "apple", "definition": "a round fruit", "example": "An apple a day." },
    ]);
    when_generating()
        .respond_with(completion(&reply.to_string()))
        .expect(1)
        .mount(&app.generation_server)
        .await;

    // Act
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.text().await.unwrap();
    assert!(message.contains("banana"));
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn campaign_fails_on_an_exhausted_pool_without_calling_the_generator() {
    // Arrange
    let app = spawn_app_with_words(&["lucid"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .expect(0)
        .mount(&app.generation_server)
        .await;

    // Act
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.text().await.unwrap().contains("exhausted"));
    assert_eq!(app.word_pool.words().await, Some(vec!["lucid".to_string()]));
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn campaign_fails_when_there_is_no_word_pool() {
    let app = spawn_app().await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .expect(0)
        .mount(&app.generation_server)
        .await;

    let response = app.post_campaign().await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.text().await.unwrap().contains("No words available"));
}

#[tokio::test]
async fn a_pool_of_two_is_emptied_and_the_next_campaign_fails() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .expect(1)
        .mount(&app.generation_server)
        .await;

    // Act - Part 1 - Use up the pool
    let response = app.post_campaign().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.word_pool.words().await, Some(vec![]));

    // Act - Part 2 - Try again
    let response = app.post_campaign().await;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn concurrent_campaigns_never_send_the_same_words() {
    // Arrange
    let app = spawn_app_with_words(&["lucid", "terse", "opaque", "wry"]).await;
    app.add_subscribers(&["a@x.com"]).await;
    when_generating()
        .respond_with(EchoDefinitions)
        .expect(2)
        .mount(&app.generation_server)
        .await;

    // Act
    let (response1, response2) = tokio::join!(app.post_campaign(), app.post_campaign());

    // Assert
    let report1: serde_json::Value = response1.json().await.unwrap();
    let report2: serde_json::Value = response2.json().await.unwrap();
    let mut words: Vec<String> = serde_json::from_value(report1["words"].clone()).unwrap();
    words.extend(serde_json::from_value::<Vec<String>>(report2["words"].clone()).unwrap());
    words.sort();

    assert_eq!(words, vec!["lucid", "opaque", "terse", "wry"]);
    assert_eq!(app.word_pool.words().await, Some(vec![]));
}
