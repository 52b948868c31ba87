use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use todobot::api::HttpBackend;
use todobot::config::UiConfig;
use todobot::notify::NotificationLog;
use todobot::view::HeadlessView;
use todobot::SessionController;

/// Controller wired to a mock server, with its notifier and view exposed
#[allow(dead_code)]
pub struct Harness {
    pub controller: SessionController,
    pub log: Arc<NotificationLog>,
    pub view: Arc<HeadlessView>,
}

#[allow(dead_code)]
pub fn harness(server: &MockServer) -> Harness {
    harness_with_timeout(server, None)
}

/// Like [`harness`], with a client-side request timeout
#[allow(dead_code)]
pub fn harness_with_timeout(server: &MockServer, timeout: Option<Duration>) -> Harness {
    let backend = Arc::new(
        HttpBackend::with_base_url(&server.uri(), timeout).expect("valid mock server url"),
    );
    let log = Arc::new(NotificationLog::new());
    let view = Arc::new(HeadlessView::new());
    let controller = SessionController::new(backend, log.clone(), view.clone(), &UiConfig::default());
    Harness {
        controller,
        log,
        view,
    }
}

/// Mount `GET /api/users` returning the given `(id, name)` pairs
#[allow(dead_code)]
pub async fn mount_users(server: &MockServer, users: &[(i64, &str)]) {
    let body: Vec<_> = users
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount `GET /api/users/{id}/conversations` returning `(role, content)` pairs
#[allow(dead_code)]
pub async fn mount_history(server: &MockServer, id: i64, records: &[(&str, &str)]) {
    let body: Vec<_> = records
        .iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/users/{}/conversations", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
