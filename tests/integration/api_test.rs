//! Integration tests for the REST surface.

mod helpers;

use http::StatusCode;

use modhub_core::types::{FileId, UrlCheckId, UserId, ViolationId};

use helpers::{TestApp, parse_id};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["users"], 1);
    assert_eq!(response.body["data"]["sessions"], 0);
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = TestApp::new();

    let alice = app.register("alice").await;
    let me = app.request("GET", "/api/users/me", None, Some(alice)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["role"], "member");
    assert_eq!(me.body["data"]["violation_count"], 0);

    let duplicate = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({ "username": "ALICE" })),
            None,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error_code(), "CONFLICT");

    let short = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({ "username": "al" })),
            None,
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.error_code(), "VALIDATION");
}

#[tokio::test]
async fn test_acting_user_header_is_required() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/messages", None, None).await;
    assert_eq!(missing.status, StatusCode::FORBIDDEN);

    let unknown = app
        .request("GET", "/api/messages", None, Some(UserId::new()))
        .await;
    assert_eq!(unknown.status, StatusCode::FORBIDDEN);
    assert_eq!(unknown.error_code(), "AUTHORIZATION");
}

#[tokio::test]
async fn test_message_submission_and_history() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let sent = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "hello there" })),
            Some(alice),
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED);
    assert_eq!(sent.body["data"]["text"], "hello there");

    let blocked = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "the password is 1234" })),
            Some(alice),
        )
        .await;
    assert_eq!(blocked.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blocked.error_code(), "POLICY_VIOLATION");

    let history = app
        .request("GET", "/api/messages?limit=10", None, Some(alice))
        .await;
    assert_eq!(history.status, StatusCode::OK);
    let messages = history.body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "hello there");
}

#[tokio::test]
async fn test_ban_threshold_over_rest() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    for _ in 0..10 {
        let response = app
            .request(
                "POST",
                "/api/messages",
                Some(serde_json::json!({ "text": "this is confidential" })),
                Some(alice),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let after = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "hello" })),
            Some(alice),
        )
        .await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);

    let user = app
        .request("GET", &format!("/api/users/{alice}"), None, Some(admin))
        .await;
    assert_eq!(user.body["data"]["is_banned"], true);
    assert_eq!(user.body["data"]["violation_count"], 10);

    let violations = app
        .request("GET", "/api/violations?reviewed=false", None, Some(admin))
        .await;
    assert_eq!(violations.status, StatusCode::OK);
    assert_eq!(violations.body["data"].as_array().unwrap().len(), 10);

    let unban = app
        .request("POST", &format!("/api/users/{alice}/unban"), None, Some(admin))
        .await;
    assert_eq!(unban.status, StatusCode::OK);
    assert_eq!(unban.body["data"]["is_banned"], false);

    let reset = app
        .request(
            "POST",
            &format!("/api/users/{alice}/reset-violations"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(reset.body["data"]["violation_count"], 0);

    let audit = app
        .request(
            "GET",
            &format!("/api/users/{alice}/violations"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(audit.body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_member_cannot_administer() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    for (method, path) in [
        ("GET", "/api/users".to_string()),
        ("GET", "/api/violations".to_string()),
        ("GET", "/api/files/pending".to_string()),
        ("POST", format!("/api/users/{bob}/ban")),
    ] {
        let response = app.request(method, &path, None, Some(alice)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {path}");
    }

    let other = app
        .request("GET", &format!("/api/users/{bob}"), None, Some(alice))
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admins_cannot_ban_each_other_or_the_root() {
    let app = TestApp::new();
    let first = app.register_admin("first").await;
    let second = app.register_admin("second").await;

    let response = app
        .request("POST", &format!("/api/users/{second}/ban"), None, Some(first))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            &format!("/api/users/{}/ban", app.root.id),
            None,
            Some(first),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let demote_root = app
        .request(
            "PUT",
            &format!("/api/users/{}/role", app.root.id),
            Some(serde_json::json!({ "role": "member" })),
            Some(app.root.id),
        )
        .await;
    assert_eq!(demote_root.status, StatusCode::FORBIDDEN);

    let banned = app
        .request(
            "POST",
            &format!("/api/users/{second}/ban"),
            None,
            Some(app.root.id),
        )
        .await;
    assert_eq!(banned.status, StatusCode::OK);
    let again = app
        .request(
            "POST",
            &format!("/api/users/{second}/ban"),
            None,
            Some(app.root.id),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_manual_file_moderation() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let admin = app.register_admin("moderator").await;

    let uploaded = app
        .upload(alice, "quarterly.docx", b"PK\x03\x04 report body", "manual")
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{:?}", uploaded.body);
    assert_eq!(uploaded.body["data"]["status"], "pending");
    assert_eq!(uploaded.body["data"]["file_type"], "docx");
    let file_id: FileId = parse_id(&uploaded.body["data"]["id"]);

    let hidden = app
        .request("GET", &format!("/api/files/{file_id}"), None, Some(bob))
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let by_member = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/approve"),
            None,
            Some(bob),
        )
        .await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);

    let approved = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/approve"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["data"]["status"], "approved");

    let twice = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/reject"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(twice.status, StatusCode::CONFLICT);

    let listed = app
        .request("GET", "/api/files/approved", None, Some(bob))
        .await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);

    let mine = app.request("GET", "/api/files/mine", None, Some(alice)).await;
    assert_eq!(mine.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_validation() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let wrong_type = app.upload(alice, "notes.txt", b"plain", "manual").await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);

    let empty = app.upload(alice, "empty.doc", b"", "manual").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let bad_mode = app.upload(alice, "ok.doc", b"data", "sometimes").await;
    assert_eq!(bad_mode.status, StatusCode::BAD_REQUEST);

    let mine = app.request("GET", "/api/files/mine", None, Some(alice)).await;
    assert!(mine.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_automated_uploads_follow_local_reputation() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    let doc = app
        .upload(alice, "clean.doc", b"\xd0\xcf\x11\xe0 doc", "automated")
        .await;
    let doc_id: FileId = parse_id(&doc.body["data"]["id"]);
    let exe = app
        .upload(alice, "tool.exe", b"MZ\x90\x00 exe", "automated")
        .await;
    let exe_id: FileId = parse_id(&exe.body["data"]["id"]);

    app.state.hub.wait_for_scans().await;

    let doc = app
        .request("GET", &format!("/api/files/{doc_id}"), None, Some(admin))
        .await;
    assert_eq!(doc.body["data"]["status"], "approved");

    let exe = app
        .request("GET", &format!("/api/files/{exe_id}"), None, Some(admin))
        .await;
    assert_eq!(exe.body["data"]["status"], "pending");
    assert_eq!(exe.body["data"]["scan_result"]["verdict"], "suspicious");

    let pending = app
        .request("GET", "/api/files/pending", None, Some(admin))
        .await;
    assert_eq!(pending.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_role_change_grants_moderation() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let before = app
        .request("GET", "/api/files/pending", None, Some(alice))
        .await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let promoted = app
        .request(
            "PUT",
            &format!("/api/users/{alice}/role"),
            Some(serde_json::json!({ "role": "admin" })),
            Some(app.root.id),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);

    let after = app
        .request("GET", "/api/files/pending", None, Some(alice))
        .await;
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn test_violation_review() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    app.request(
        "POST",
        "/api/messages",
        Some(serde_json::json!({ "text": "secret stuff" })),
        Some(alice),
    )
    .await;

    let open = app
        .request("GET", "/api/violations?reviewed=false", None, Some(admin))
        .await;
    let entries = open.body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["matched_terms"][0]["term"], "secret");
    let violation_id: ViolationId = parse_id(&entries[0]["id"]);

    let reviewed = app
        .request(
            "POST",
            &format!("/api/violations/{violation_id}/review"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(reviewed.status, StatusCode::OK);
    assert_eq!(reviewed.body["data"]["is_reviewed"], true);

    let open = app
        .request("GET", "/api/violations?reviewed=false", None, Some(admin))
        .await;
    assert!(open.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_link_review_over_rest() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    let held = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "read https://docs.rs/axum" })),
            Some(alice),
        )
        .await;
    assert_eq!(held.status, StatusCode::ACCEPTED);
    let checks = held.body["data"].as_array().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0]["url"], "https://docs.rs/axum");
    assert_eq!(checks[0]["status"], "pending");
    let check_id: UrlCheckId = parse_id(&checks[0]["id"]);

    let forbidden = app
        .request("GET", "/api/url-checks/pending", None, Some(alice))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let pending = app
        .request("GET", "/api/url-checks/pending", None, Some(admin))
        .await;
    assert_eq!(pending.body["data"].as_array().unwrap().len(), 1);

    let history = app.request("GET", "/api/messages", None, Some(alice)).await;
    assert!(history.body["data"].as_array().unwrap().is_empty());

    let approved = app
        .request(
            "POST",
            &format!("/api/url-checks/{check_id}/mark-safe"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["data"]["status"], "safe");
    assert_eq!(approved.body["data"]["is_reviewed"], true);

    let again = app
        .request(
            "POST",
            &format!("/api/url-checks/{check_id}/mark-malicious"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let history = app.request("GET", "/api/messages", None, Some(alice)).await;
    let messages = history.body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "read https://docs.rs/axum");

    let safe = app
        .request("GET", "/api/url-checks?status=safe", None, Some(admin))
        .await;
    assert_eq!(safe.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_link_scan_over_rest() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let admin = app.register_admin("moderator").await;

    let held = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "prize at https://virus.test/claim" })),
            Some(alice),
        )
        .await;
    let check_id: UrlCheckId = parse_id(&held.body["data"][0]["id"]);

    let scanned = app
        .request(
            "POST",
            &format!("/api/url-checks/{check_id}/scan"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(scanned.status, StatusCode::OK);
    assert_eq!(scanned.body["data"]["status"], "malicious");
    assert_eq!(scanned.body["data"]["scan"]["verdict"], "malicious");

    let refused = app
        .request(
            "POST",
            "/api/messages",
            Some(serde_json::json!({ "text": "again https://virus.test/claim" })),
            Some(alice),
        )
        .await;
    assert_eq!(refused.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(refused.error_code(), "POLICY_VIOLATION");

    let missing = app
        .request(
            "POST",
            &format!("/api/url-checks/{}/scan", UrlCheckId::new()),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
