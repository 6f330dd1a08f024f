//! Integration tests for the HTTP advisor webhook.
//!
//! Each test spins up a fake webhook on a random port and points a
//! `WebhookResponder` at it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use instastore::advisor::{
    CollectedFields, ConversationEngine, Phase, Responder, ResponderRequest, SubmitOutcome,
    WebhookResponder,
};
use instastore::advisor::prompts::SCRIPTED_PROMPTS;
use instastore::advisor::responder::MAX_RESPONSE_BYTES;
use instastore::error::ResponderError;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How the fake webhook answers.
#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(StatusCode),
    Text(&'static str),
    Slow(Duration),
}

#[derive(Clone)]
struct Hook {
    reply: Reply,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn webhook(State(hook): State<Hook>, Json(body): Json<Value>) -> axum::response::Response {
    hook.received.lock().unwrap().push(body);
    match hook.reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(status) => (status, "upstream broke").into_response(),
        Reply::Text(text) => text.into_response(),
        Reply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({"response": "too late"})).into_response()
        }
    }
}

/// Start a fake webhook, return (url, received bodies).
async fn start_hook(reply: Reply) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let hook = Hook {
        reply,
        received: Arc::clone(&received),
    };
    let app = Router::new().route("/hook", post(webhook)).with_state(hook);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}/hook"), received)
}

fn request(message: &str) -> ResponderRequest {
    ResponderRequest {
        message: message.to_string(),
        product_id: "3".to_string(),
        step: 0,
        customer_info: CollectedFields {
            name: Some(message.to_string()),
            ..Default::default()
        },
        user_id: Some("visitor-1".to_string()),
    }
}

fn responder(url: &str) -> WebhookResponder {
    WebhookResponder::new(url, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn object_reply_and_request_body() {
    timeout(TEST_TIMEOUT, async {
        let (url, received) = start_hook(Reply::Json(json!({"response": "Custom reply"}))).await;

        let reply = responder(&url).respond(&request("Carla")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Custom reply"));

        let bodies = received.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(
            bodies[0],
            json!({
                "message": "Carla",
                "productId": "3",
                "step": 0,
                "customerInfo": {"name": "Carla", "location": null, "question": null},
                "userId": "visitor-1"
            })
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn array_reply() {
    timeout(TEST_TIMEOUT, async {
        let (url, _) = start_hook(Reply::Json(json!([{"response": "from array"}]))).await;
        let reply = responder(&url).respond(&request("x")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("from array"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unusable_json_is_no_reply() {
    timeout(TEST_TIMEOUT, async {
        let (url, _) = start_hook(Reply::Json(json!({"ok": true}))).await;
        let reply = responder(&url).respond(&request("x")).await.unwrap();
        assert!(reply.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn error_status_is_a_failure() {
    timeout(TEST_TIMEOUT, async {
        let (url, _) = start_hook(Reply::Status(StatusCode::BAD_GATEWAY)).await;
        let err = responder(&url).respond(&request("x")).await.unwrap_err();
        assert!(matches!(err, ResponderError::BadStatus { status: 502 }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_json_body_is_a_failure() {
    timeout(TEST_TIMEOUT, async {
        let (url, _) = start_hook(Reply::Text("Workflow was started")).await;
        let err = responder(&url).respond(&request("x")).await.unwrap_err();
        assert!(matches!(err, ResponderError::InvalidResponse(_)));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn oversized_body_is_a_failure() {
    timeout(TEST_TIMEOUT, async {
        let huge = "x".repeat(MAX_RESPONSE_BYTES + 1);
        let (url, _) = start_hook(Reply::Json(json!({"response": huge}))).await;
        let err = responder(&url).respond(&request("x")).await.unwrap_err();
        match err {
            ResponderError::InvalidResponse(message) => {
                assert!(message.contains(&MAX_RESPONSE_BYTES.to_string()))
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn large_body_within_limit_is_accepted() {
    timeout(TEST_TIMEOUT, async {
        let long = "y".repeat(MAX_RESPONSE_BYTES / 2);
        let (url, _) = start_hook(Reply::Json(json!({"response": long.clone()}))).await;
        let reply = responder(&url).respond(&request("x")).await.unwrap();
        assert_eq!(reply, Some(long));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn slow_webhook_times_out() {
    timeout(TEST_TIMEOUT, async {
        let (url, _) = start_hook(Reply::Slow(Duration::from_secs(3))).await;
        let responder = WebhookResponder::new(&url, Duration::from_millis(200)).unwrap();
        let err = responder.respond(&request("x")).await.unwrap_err();
        assert!(matches!(err, ResponderError::Timeout(_)));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_webhook_is_a_failure() {
    timeout(TEST_TIMEOUT, async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let responder = responder(&format!("http://127.0.0.1:{port}/hook"));
        let err = responder.respond(&request("x")).await.unwrap_err();
        assert!(matches!(
            err,
            ResponderError::RequestFailed(_) | ResponderError::Timeout(_)
        ));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn engine_over_failing_webhook_keeps_going() {
    timeout(TEST_TIMEOUT, async {
        let (url, received) = start_hook(Reply::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let engine = ConversationEngine::new("1", Arc::new(responder(&url)));

        match engine.submit("Bob").await {
            SubmitOutcome::Accepted(report) => {
                assert!(report.notice.is_some());
                assert_eq!(
                    report.advisor_turn.map(|t| t.text).as_deref(),
                    Some(SCRIPTED_PROMPTS[1])
                );
            }
            other => panic!("expected accepted submission, got {other:?}"),
        }
        assert_eq!(engine.snapshot().phase, Phase::Onboarding { step: 1 });
        assert_eq!(received.lock().unwrap().len(), 1);
    })
    .await
    .expect("test timed out");
}
