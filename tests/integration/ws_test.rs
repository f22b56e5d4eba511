//! Integration tests for WebSocket connection and messaging.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use modhub_core::types::{FileId, UserId};

use helpers::{TestApp, parse_id};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    addr
}

async fn connect(addr: SocketAddr, user: UserId) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?user_id={user}"))
        .await
        .expect("WebSocket connect failed");
    socket
}

async fn send_json(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next frame of the given `type`, skipping everything else.
async fn next_of_kind(socket: &mut Socket, kind: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = socket
                .next()
                .await
                .expect("Socket closed")
                .expect("Socket error");
            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
                if value["type"] == kind {
                    return value;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("No '{kind}' frame within timeout"))
}

#[tokio::test]
async fn test_unknown_and_banned_users_are_refused() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let bob = app.register("bob").await;

    let unknown = connect_async(format!("ws://{addr}/ws?user_id={}", UserId::new())).await;
    assert!(unknown.is_err());

    let banned = app
        .request(
            "POST",
            &format!("/api/users/{bob}/ban"),
            None,
            Some(app.root.id),
        )
        .await;
    assert_eq!(banned.status, StatusCode::OK);

    let refused = connect_async(format!("ws://{addr}/ws?user_id={bob}")).await;
    assert!(refused.is_err());
}

#[tokio::test]
async fn test_chat_fan_out_and_echo() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let mut alice_ws = connect(addr, alice).await;
    let mut bob_ws = connect(addr, bob).await;
    app.wait_for_sessions(2).await;

    send_json(
        &mut alice_ws,
        json!({ "type": "message", "user_id": alice.to_string(), "user": "alice", "text": "hello bob" }),
    )
    .await;

    let received = next_of_kind(&mut bob_ws, "message").await;
    assert_eq!(received["text"], "hello bob");
    assert_eq!(received["user"], "alice");

    let echo = next_of_kind(&mut alice_ws, "message").await;
    assert_eq!(echo["id"], received["id"]);
}

#[tokio::test]
async fn test_blocked_message_only_answers_sender() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let mut alice_ws = connect(addr, alice).await;
    let mut bob_ws = connect(addr, bob).await;
    app.wait_for_sessions(2).await;

    send_json(&mut alice_ws, json!({ "type": "message", "text": "top secret" })).await;
    let error = next_of_kind(&mut alice_ws, "error").await;
    assert_eq!(error["code"], "POLICY_VIOLATION");

    send_json(&mut alice_ws, json!({ "type": "message", "text": "never mind" })).await;
    let first_seen = next_of_kind(&mut bob_ws, "message").await;
    assert_eq!(first_seen["text"], "never mind");
}

#[tokio::test]
async fn test_identity_mismatch_is_rejected() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let mut alice_ws = connect(addr, alice).await;
    app.wait_for_sessions(1).await;

    send_json(
        &mut alice_ws,
        json!({ "type": "message", "user_id": bob.to_string(), "text": "spoofed" }),
    )
    .await;
    let error = next_of_kind(&mut alice_ws, "error").await;
    assert_eq!(error["code"], "AUTHORIZATION");

    send_json(&mut alice_ws, json!({ "type": "nonsense" })).await;
    let error = next_of_kind(&mut alice_ws, "error").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_ban_pushes_account_status() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let bob = app.register("bob").await;
    let admin = app.register_admin("moderator").await;

    let mut bob_ws = connect(addr, bob).await;
    let mut admin_ws = connect(addr, admin).await;
    app.wait_for_sessions(2).await;

    let banned = app
        .request("POST", &format!("/api/users/{bob}/ban"), None, Some(admin))
        .await;
    assert_eq!(banned.status, StatusCode::OK);

    let status = next_of_kind(&mut bob_ws, "account_status").await;
    assert_eq!(status["is_banned"], true);

    send_json(&mut bob_ws, json!({ "type": "message", "text": "let me in" })).await;
    let error = next_of_kind(&mut bob_ws, "error").await;
    assert_eq!(error["code"], "AUTHORIZATION");

    send_json(&mut admin_ws, json!({ "type": "message", "text": "admins only now" })).await;
    let echo = next_of_kind(&mut admin_ws, "message").await;
    assert_eq!(echo["text"], "admins only now");
}

#[tokio::test]
async fn test_auto_ban_alerts_admins() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    let mut alice_ws = connect(addr, alice).await;
    let mut admin_ws = connect(addr, admin).await;
    app.wait_for_sessions(2).await;

    for _ in 0..10 {
        send_json(&mut alice_ws, json!({ "type": "message", "text": "bank card please" })).await;
    }

    let warning = next_of_kind(&mut admin_ws, "admin_notification").await;
    assert_eq!(warning["notification_type"], "violation_warning");
    assert_eq!(warning["violation_count"], 5);

    let banned = next_of_kind(&mut admin_ws, "admin_notification").await;
    assert_eq!(banned["notification_type"], "user_banned");
    assert_eq!(banned["is_banned"], true);
    assert_eq!(banned["violation_count"], 10);

    let status = next_of_kind(&mut alice_ws, "account_status").await;
    assert_eq!(status["is_banned"], true);
}

#[tokio::test]
async fn test_file_announcement_and_status_update() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let admin = app.register_admin("moderator").await;

    let mut bob_ws = connect(addr, bob).await;
    app.wait_for_sessions(1).await;

    let uploaded = app
        .upload(alice, "setup.exe", b"MZ\x90\x00 installer", "manual")
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let file_id: FileId = parse_id(&uploaded.body["data"]["id"]);

    let announced = next_of_kind(&mut bob_ws, "file").await;
    assert_eq!(announced["file"]["filename"], "setup.exe");
    assert_eq!(announced["file"]["status"], "pending");

    let approved = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/approve"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);

    let update = next_of_kind(&mut bob_ws, "file_status_update").await;
    assert_eq!(update["file_id"], file_id.to_string());
    assert_eq!(update["status"], "approved");
}

#[tokio::test]
async fn test_server_close_flushes_queued_frames() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let mut alice_ws = connect(addr, alice).await;
    app.wait_for_sessions(1).await;

    for i in 0..3 {
        let sent = app
            .request(
                "POST",
                "/api/messages",
                Some(json!({ "text": format!("notice {i}") })),
                Some(bob),
            )
            .await;
        assert_eq!(sent.status, StatusCode::CREATED);
    }
    app.state.realtime.shutdown();

    let mut texts = Vec::new();
    let mut closed = false;
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(Ok(frame)) = alice_ws.next().await {
            match frame {
                Message::Text(text) => {
                    let value: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
                    if value["type"] == "message" {
                        texts.push(value["text"].as_str().unwrap_or_default().to_string());
                    }
                }
                Message::Close(_) => {
                    closed = true;
                    break;
                }
                _ => {}
            }
        }
    })
    .await
    .expect("Socket did not close");

    assert_eq!(texts, vec!["notice 0", "notice 1", "notice 2"]);
    assert!(closed);
}
