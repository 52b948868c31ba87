//! HTTP backend integration tests
//!
//! Exercises `HttpBackend` against a `wiremock` server: request shapes,
//! response parsing, and the categorization of failures into `ApiError`.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use todobot::api::{Backend, HttpBackend, TodoStats, User, UserId};
use todobot::ApiError;

/// Log sink shared with a scoped tracing subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Subscriber using the chat command's default filter
fn default_filter_subscriber(logs: &CapturedLogs) -> impl tracing::Subscriber + Send + Sync {
    let logs = logs.clone();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("todobot=warn"))
        .with_ansi(false)
        .with_writer(move || logs.clone())
        .finish()
}

fn closed_port_uri() -> String {
    // Bind then release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{}", port)
}

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::with_base_url(&server.uri(), Some(Duration::from_secs(5))).expect("valid url")
}

#[tokio::test]
async fn test_list_users_parses_array_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "name": "Bob" },
            { "id": 1, "name": "Alice" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = backend(&server).list_users().await.unwrap();
    assert_eq!(users, vec![User::new(2, "Bob"), User::new(1, "Alice")]);
}

#[tokio::test]
async fn test_create_user_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(json!({ "name": "Carol" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "name": "Carol" })))
        .expect(1)
        .mount(&server)
        .await;

    let user = backend(&server).create_user("Carol").await.unwrap();
    assert_eq!(user, User::new(3, "Carol"));
}

#[tokio::test]
async fn test_create_user_rejection_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "User already exists" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server).create_user("Alice").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 400,
            detail: Some("User already exists".to_string()),
        }
    );
}

#[tokio::test]
async fn test_non_string_detail_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{ "loc": ["body", "name"], "msg": "field required" }]
        })))
        .mount(&server)
        .await;

    let err = backend(&server).create_user("x").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            detail: None,
        }
    );
}

#[tokio::test]
async fn test_history_maps_roles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hello" }
        ])))
        .mount(&server)
        .await;

    let records = backend(&server)
        .conversation_history(&UserId::Int(1))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records[0].is_assistant());
    assert!(records[1].is_assistant());
    assert_eq!(records[1].content, "hello");
}

#[tokio::test]
async fn test_chat_sends_user_id_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/chat"))
        .and(body_json(json!({ "user_id": 1, "message": "buy milk" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Added!" })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server)
        .chat(&UserId::Int(1), "buy milk")
        .await
        .unwrap();
    assert_eq!(reply, "Added!");
}

#[tokio::test]
async fn test_chat_server_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server).chat(&UserId::Int(1), "x").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 500,
            detail: None,
        }
    );
}

#[tokio::test]
async fn test_todos_parses_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "task": "buy milk",
                "completed": false,
                "created_at": "2024-05-01T10:00:00",
                "completed_at": null
            },
            {
                "id": 8,
                "task": "call mom",
                "completed": true,
                "created_at": "2024-05-01T10:05:00",
                "completed_at": "2024-05-02T09:00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let todos = backend(&server).todos(&UserId::Int(1)).await.unwrap();

    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].task, "buy milk");
    assert!(todos[0].completed_at.is_none());
    assert!(todos[1].completed);
    assert_eq!(todos[1].completed_at.as_deref(), Some("2024-05-02T09:00:00"));
}

#[tokio::test]
async fn test_todo_stats_parses_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/1/todos/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "total": 3, "completed": 1, "pending": 2 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stats = backend(&server).todo_stats(&UserId::Int(1)).await.unwrap();
    assert_eq!(
        stats,
        TodoStats {
            total: 3,
            completed: 1,
            pending: 2
        }
    );
}

#[tokio::test]
async fn test_todos_for_unknown_user_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/99/todos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "User not found" })))
        .mount(&server)
        .await;

    let err = backend(&server).todos(&UserId::Int(99)).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 404,
            detail: Some("User not found".to_string())
        }
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "wrong field" })))
        .mount(&server)
        .await;

    let err = backend(&server).chat(&UserId::Int(1), "x").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let uri = closed_port_uri();
    let backend = HttpBackend::with_base_url(&uri, Some(Duration::from_secs(2))).unwrap();
    let err = backend.list_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_sub_second_timeout_is_honored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;
    let backend =
        HttpBackend::with_base_url(&server.uri(), Some(Duration::from_millis(200))).unwrap();

    let started = Instant::now();
    let err = backend.list_users().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert!(started.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_failed_requests_are_silent_at_default_log_level() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let logs = CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(default_filter_subscriber(&logs));

    let rejected = backend(&server).chat(&UserId::Int(1), "x").await;
    let undecodable = backend(&server)
        .conversation_history(&UserId::Int(1))
        .await;
    let unreachable = HttpBackend::with_base_url(&closed_port_uri(), None)
        .unwrap()
        .list_users()
        .await;

    assert!(matches!(rejected, Err(ApiError::Rejected { status: 500, .. })));
    assert!(matches!(undecodable, Err(ApiError::Decode(_))));
    assert!(matches!(unreachable, Err(ApiError::Transport(_))));
    assert_eq!(logs.text(), "");
}
