use std::time::Duration;

use jobwatch_core::{JobRecord, Verdict};
use jobwatch_engine::{Classifier, ClassifierSettings, GeminiClassifier};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn record() -> JobRecord {
    JobRecord::from_page(
        "https://b.com/job2",
        Some("Software Engineer - Fresher"),
        "Walk-in for 2025 batch in Bengaluru",
    )
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

fn classifier_for(server: &MockServer) -> GeminiClassifier {
    GeminiClassifier::new(
        ClassifierSettings {
            endpoint: format!("{}{}", server.uri(), MODEL_PATH),
            request_timeout: Duration::from_secs(5),
        },
        "test-key",
    )
    .unwrap()
}

async fn mount_reply(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn request_carries_prompt_in_user_content() {
    jobwatch_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({ "contents": [{ "role": "user" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("YES")))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = classifier_for(&server).classify(&record()).await;
    assert_eq!(verdict, Verdict::Accepted);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Software Engineer - Fresher"));
    assert!(prompt.contains("- Source: b.com"));
}

#[tokio::test]
async fn yes_anywhere_in_reply_accepts() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200).set_body_json(reply("yes, this matches\n")),
    )
    .await;

    assert_eq!(classifier_for(&server).classify(&record()).await, Verdict::Accepted);
}

#[tokio::test]
async fn plain_no_rejects() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(reply("NO"))).await;

    assert_eq!(classifier_for(&server).classify(&record()).await, Verdict::Rejected);
}

#[tokio::test]
async fn missing_reply_path_rejects() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
    )
    .await;

    assert_eq!(classifier_for(&server).classify(&record()).await, Verdict::Rejected);
}

#[tokio::test]
async fn service_errors_fail_closed() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(500).set_body_string("YES")).await;
    assert_eq!(classifier_for(&server).classify(&record()).await, Verdict::Rejected);

    let garbled = MockServer::start().await;
    mount_reply(&garbled, ResponseTemplate::new(200).set_body_string("YES but not json")).await;
    assert_eq!(classifier_for(&garbled).classify(&record()).await, Verdict::Rejected);
}

#[tokio::test]
async fn generate_reports_status_errors() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(403).set_body_string("bad key")).await;

    let err = classifier_for(&server).generate("hi").await.unwrap_err();
    assert_eq!(err.to_string(), "classifier returned status 403: bad key");
}
