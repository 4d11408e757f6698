use hohm_core::db::open_db;
use hohm_core::{MailError, MailReceipt, Mailer, OutgoingEmail};
use hohm_server::{build_router, AppState};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const MAIL_FROM: &str = "Task Notifier <test@hohm.app>";

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<MailReceipt, MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(MailReceipt {
            payload: json!({ "id": "msg_1" }),
        })
    }
}

struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _email: &OutgoingEmail) -> Result<MailReceipt, MailError> {
        Err(MailError::Rejected {
            status: 422,
            body: "invalid from".to_string(),
        })
    }
}

struct TestServer {
    addr: std::net::SocketAddr,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    fn count(&self, table: &str) -> i64 {
        count_rows(&self.db_path, table)
    }
}

async fn start(mailer: Arc<dyn Mailer>) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("hohm.sqlite3");
    let conn = open_db(&db_path).expect("open db");
    let state = AppState::new(conn, mailer, MAIL_FROM).with_password_cost(4);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    TestServer {
        addr,
        db_path,
        _dir: dir,
    }
}

fn count_rows(db_path: &Path, table: &str) -> i64 {
    let conn = Connection::open(db_path).expect("open sqlite");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .expect("count rows")
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (u16, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        req.push_str("\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    let json = serde_json::from_str(body).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(addr: std::net::SocketAddr, path: &str, body: &Value) -> (u16, Value) {
    send_raw(addr, "POST", path, Some(&body.to_string())).await
}

#[tokio::test]
async fn health_reports_version() {
    let server = start(Arc::new(RecordingMailer::default())).await;
    let (status, body) = send_raw(server.addr, "GET", "/api/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], hohm_core::core_version());
}

#[tokio::test]
async fn household_create_and_fetch() {
    let server = start(Arc::new(RecordingMailer::default())).await;

    let (status, created) =
        post_json(server.addr, "/api/households", &json!({ "name": "Maple St" })).await;
    assert_eq!(status, 200);
    assert_eq!(created["name"], "Maple St");
    assert!(created["createdAt"].is_string());
    let id = created["id"].as_i64().expect("household id");

    let (status, fetched) =
        send_raw(server.addr, "GET", &format!("/api/households/{id}"), None).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    let (status, body) = send_raw(server.addr, "GET", "/api/households/999", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Household not found.");
}

#[tokio::test]
async fn household_without_name_is_rejected_and_not_created() {
    let server = start(Arc::new(RecordingMailer::default())).await;

    for payload in [json!({}), json!({ "name": "" }), json!({ "name": "   " })] {
        let (status, body) = post_json(server.addr, "/api/households", &payload).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Name is required");
    }
    assert_eq!(server.count("households"), 0);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let server = start(Arc::new(RecordingMailer::default())).await;
    let (status, body) =
        send_raw(server.addr, "POST", "/api/households", Some("{\"name\":")).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
    assert_eq!(server.count("households"), 0);
}

#[tokio::test]
async fn commit_persists_the_draft_roster() {
    let server = start(Arc::new(RecordingMailer::default())).await;
    let (_, created) =
        post_json(server.addr, "/api/households", &json!({ "name": "Maple St" })).await;
    let id = created["id"].as_i64().expect("household id");

    let draft = json!({
        "schemaVersion": 1,
        "members": [{ "name": "Ava", "email": "a@x.com", "color": "#12ab34", "points": 0 }],
        "tasks": [{
            "title": "Dishes",
            "date": "2024-06-01",
            "time": "18:00",
            "assignedTo": "Ava",
            "comments": ["soon"]
        }]
    });
    let (status, body) =
        post_json(server.addr, &format!("/api/households/{id}/commit"), &draft).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true, "members": 1, "tasks": 1 }));
    assert_eq!(server.count("household_members"), 1);
    assert_eq!(server.count("household_tasks"), 1);
    assert_eq!(server.count("task_comments"), 1);

    let (status, _) = post_json(server.addr, "/api/households/999/commit", &draft).await;
    assert_eq!(status, 404);

    let mut orphan = draft.clone();
    orphan["tasks"][0]["assignedTo"] = json!("Nobody");
    let (status, body) =
        post_json(server.addr, &format!("/api/households/{id}/commit"), &orphan).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Nobody"));
    assert_eq!(server.count("household_tasks"), 1);
}

#[tokio::test]
async fn signup_then_login() {
    let server = start(Arc::new(RecordingMailer::default())).await;
    let account = json!({ "name": "Ava", "email": "a@x.com", "password": "hunter22" });

    let (status, body) = post_json(server.addr, "/api/signup", &account).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = post_json(
        server.addr,
        "/api/login",
        &json!({ "email": "a@x.com", "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = post_json(
        server.addr,
        "/api/login",
        &json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_duplicate_email() {
    let server = start(Arc::new(RecordingMailer::default())).await;

    let (status, body) = post_json(
        server.addr,
        "/api/signup",
        &json!({ "name": "Ava", "email": "a@x.com" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing fields");
    assert_eq!(server.count("users"), 0);

    let account = json!({ "name": "Ava", "email": "a@x.com", "password": "pw" });
    assert_eq!(post_json(server.addr, "/api/signup", &account).await.0, 200);

    let again = json!({ "name": "Other", "email": "a@x.com", "password": "pw2" });
    let (status, body) = post_json(server.addr, "/api/signup", &again).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Email already in use");
    assert_eq!(server.count("users"), 1);
}

#[tokio::test]
async fn comment_email_is_rendered_and_sent_once() {
    let mailer = Arc::new(RecordingMailer::default());
    let server = start(mailer.clone()).await;

    let (status, body) = post_json(
        server.addr,
        "/api/send-comment-email",
        &json!({
            "recipientEmail": "a@x.com",
            "taskTitle": "Dishes",
            "commentText": "<b>done?</b>"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true, "data": { "id": "msg_1" } }));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, MAIL_FROM);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, "New Comment on Task: \"Dishes\"");
    assert!(sent[0].html.contains("<strong>Someone</strong>"));
    assert!(sent[0].html.contains("&lt;b&gt;done?&lt;/b&gt;"));
}

#[tokio::test]
async fn comment_email_validation_and_provider_failure() {
    let recording = Arc::new(RecordingMailer::default());
    let server = start(recording.clone()).await;
    let (status, body) = post_json(
        server.addr,
        "/api/send-comment-email",
        &json!({ "recipientEmail": "a@x.com", "taskTitle": "Dishes" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing fields");
    assert!(recording.sent.lock().unwrap().is_empty());

    let server = start(Arc::new(FailingMailer)).await;
    let (status, body) = post_json(
        server.addr,
        "/api/send-comment-email",
        &json!({
            "recipientEmail": "a@x.com",
            "taskTitle": "Dishes",
            "commentText": "nice"
        }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to send email");
}

#[tokio::test]
async fn non_numeric_household_id_is_a_json_validation_error() {
    let server = start(Arc::new(RecordingMailer::default())).await;

    let (status, body) = send_raw(server.addr, "GET", "/api/households/abc", None).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, body) =
        post_json(server.addr, "/api/households/abc/commit", &json!({ "members": [] })).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn commit_with_repeated_task_id_is_rejected_as_invalid() {
    let server = start(Arc::new(RecordingMailer::default())).await;
    let (_, created) =
        post_json(server.addr, "/api/households", &json!({ "name": "Maple St" })).await;
    let id = created["id"].as_i64().expect("household id");

    let task_id = "8f14e45f-ceea-4e6a-9f6b-2d1c7a3b5e90";
    let draft = json!({
        "members": [{ "name": "Ava", "email": "a@x.com", "color": "#12ab34" }],
        "tasks": [
            { "id": task_id, "title": "Dishes", "date": "2024-06-01", "time": "18:00", "assignedTo": "Ava" },
            { "id": task_id, "title": "Trash", "date": "2024-06-02", "time": "07:30", "assignedTo": "Ava" }
        ]
    });
    let (status, body) =
        post_json(server.addr, &format!("/api/households/{id}/commit"), &draft).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains(task_id));
    assert_eq!(server.count("household_tasks"), 0);
}
