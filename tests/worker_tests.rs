use anyhow::Result;
use notify_dispatch::{
    channels::{email::EmailChannel, push::PushChannel},
    clients::{fcm::FcmClient, mailer::MailerClient},
    config::Config,
    worker::{Disposition, FailurePolicy, process_payload},
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn test_config(mail_api_url: &str) -> Config {
    Config {
        rabbitmq_url: "amqp://localhost".to_string(),
        email_queue_name: "email.queue".to_string(),
        push_queue_name: "push.queue".to_string(),
        dead_letter_queue_name: None,
        user_service_url: "http://127.0.0.1:1".to_string(),
        user_lookup_timeout_seconds: 2,
        mail_api_url: mail_api_url.to_string(),
        mail_from_address: "noreply@example.com".to_string(),
        fcm_project_id: "test-project".to_string(),
        gateway_port: 0,
        email_service_port: 0,
        push_service_port: 0,
    }
}

fn email_payload() -> Value {
    json!({
        "notification_type": "email",
        "request_id": "r1",
        "user_id": "u1",
        "template_code": "welcome",
        "variables": { "name": "Ana", "link": "http://x", "subject": "Hi" },
        "metadata": {},
        "user_email": "ana@x.com"
    })
}

/// Test: A successful provider send acknowledges the message
#[tokio::test]
async fn test_successful_email_delivery_is_acknowledged() -> Result<()> {
    let mail_relay = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({
            "from": "noreply@example.com",
            "to": "ana@x.com",
            "subject": "Hi",
            "html": "<h1>Welcome Ana</h1><p>Visit: http://x</p>"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mail_relay)
        .await;

    let config = test_config(&mail_relay.uri());
    let handler = EmailChannel::new(MailerClient::new(&config)?);

    let payload = serde_json::to_vec(&email_payload())?;
    let disposition = process_payload(&handler, &payload).await;

    assert_eq!(disposition, Disposition::Ack);

    Ok(())
}

/// Test: A failed provider send rejects the message after exactly one attempt
#[tokio::test]
async fn test_failed_email_delivery_is_rejected_without_retry() -> Result<()> {
    let mail_relay = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mail_relay)
        .await;

    let config = test_config(&mail_relay.uri());
    let handler = EmailChannel::new(MailerClient::new(&config)?);

    let payload = serde_json::to_vec(&email_payload())?;
    let disposition = process_payload(&handler, &payload).await;

    match disposition {
        Disposition::Fail { reason } => {
            assert!(reason.contains("provider send failed"), "got: {}", reason);
        }
        other => panic!("expected Fail, got {:?}", other),
    }

    Ok(())
}

/// Test: An undecodable payload is discarded as poison
#[tokio::test]
async fn test_malformed_payload_is_discarded() -> Result<()> {
    let mail_relay = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mail_relay)
        .await;

    let config = test_config(&mail_relay.uri());
    let handler = EmailChannel::new(MailerClient::new(&config)?);

    let disposition = process_payload(&handler, b"{ not json }").await;

    match disposition {
        Disposition::Discard { reason } => {
            assert!(reason.contains("malformed message"), "got: {}", reason);
        }
        other => panic!("expected Discard, got {:?}", other),
    }

    Ok(())
}

/// Test: An email envelope without an address fails delivery
#[tokio::test]
async fn test_email_without_address_fails_delivery() -> Result<()> {
    let mail_relay = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mail_relay)
        .await;

    let config = test_config(&mail_relay.uri());
    let handler = EmailChannel::new(MailerClient::new(&config)?);

    let mut payload = email_payload();
    payload.as_object_mut().unwrap().remove("user_email");

    let disposition = process_payload(&handler, &serde_json::to_vec(&payload)?).await;

    match disposition {
        Disposition::Fail { reason } => {
            assert!(reason.contains("missing recipient address"), "got: {}", reason);
        }
        other => panic!("expected Fail, got {:?}", other),
    }

    Ok(())
}

/// Test: A tokenless push message is acknowledged without a send attempt
#[tokio::test]
async fn test_push_without_token_is_acknowledged() -> Result<()> {
    let config = test_config("http://127.0.0.1:1");
    let handler = PushChannel::new(FcmClient::new(&config));

    let payload = serde_json::to_vec(&json!({
        "notification_type": "push",
        "request_id": "r2",
        "user_id": "u2",
        "template_code": "welcome",
        "variables": {},
        "metadata": {}
    }))?;

    // Any send attempt would fail here (no credentials, no network); Ack
    // proves the worker never tried.
    let disposition = process_payload(&handler, &payload).await;
    assert_eq!(disposition, Disposition::Ack);

    Ok(())
}

/// Test: An empty push token counts as absent
#[tokio::test]
async fn test_push_with_empty_token_is_acknowledged() -> Result<()> {
    let config = test_config("http://127.0.0.1:1");
    let handler = PushChannel::new(FcmClient::new(&config));

    let payload = serde_json::to_vec(&json!({
        "notification_type": "push",
        "request_id": "r3",
        "user_id": "u3",
        "template_code": "welcome",
        "variables": {},
        "metadata": {},
        "push_token": ""
    }))?;

    let disposition = process_payload(&handler, &payload).await;
    assert_eq!(disposition, Disposition::Ack);

    Ok(())
}

/// Test: The failure policy follows the dead-letter configuration
#[tokio::test]
async fn test_failure_policy_from_config() -> Result<()> {
    let mut config = test_config("http://127.0.0.1:1");
    assert!(matches!(
        FailurePolicy::from_config(&config),
        FailurePolicy::Drop
    ));

    config.dead_letter_queue_name = Some("failed.queue".to_string());
    match FailurePolicy::from_config(&config) {
        FailurePolicy::DeadLetter { queue } => assert_eq!(queue, "failed.queue"),
        FailurePolicy::Drop => panic!("expected DeadLetter policy"),
    }

    Ok(())
}
