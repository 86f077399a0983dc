#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::{
    body::Body,
    extract::Request,
    http::{header, Method, StatusCode},
};
use tower::ServiceExt;

use common::{body_json, body_string, get, harness, ALLOWED_ORIGIN};

#[tokio::test]
async fn health_endpoints_exact_bodies() {
    let h = harness(&[]);

    let resp = h.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#"{"msg":"API is up and running"}"#);

    let resp = h.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#"{"msg":"API is healthy"}"#);
}

#[tokio::test]
async fn health_is_idempotent() {
    let h = harness(&[]);
    let mut bodies = Vec::new();
    for _ in 0..5 {
        let resp = h.app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(body_string(resp).await);
    }
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    assert!(h.chat.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn health_ignores_invalid_credentials() {
    let h = harness(&[]);
    let req = Request::builder()
        .uri("/health")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_origin_header_gets_no_cors_rejection() {
    let h = harness(&[]);
    let resp = h.app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn allowed_origin_is_echoed_with_credentials() {
    let h = harness(&[]);
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn unknown_origin_is_withheld_but_request_still_runs() {
    let h = harness(&[]);
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn allow_any_variant_is_never_credentialed() {
    let h = harness(&[("CORS_ALLOW_ANY", "true"), ("CLIENT_URL", "")]);
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://anything.example")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .is_none());
}

#[tokio::test]
async fn preflight_for_allowed_origin() {
    let h = harness(&[]);
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/sessions")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,authorization")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );
    let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("POST"));
    assert!(h.sessions.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chat_request_forwarded_unmodified() {
    let h = harness(&[]);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/chat/anything?x=1")
        .header(header::AUTHORIZATION, "Bearer valid-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text":"hi"}"#))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"], "user_42");

    let seen = h.chat.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path_and_query, "/api/chat/anything?x=1");
    assert_eq!(seen[0].body, br#"{"text":"hi"}"#);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer valid-token"));
    assert!(h.sessions.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn protected_group_decides_on_missing_identity() {
    let h = harness(&[]);
    let resp = h.app.oneshot(get("/api/sessions/active")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["code"], "UNAUTHENTICATED");

    let seen = h.sessions.seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "gate must not block before the handler");
    assert_eq!(seen[0].user, None);
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let h = harness(&[]);
    let req = Request::builder()
        .uri("/api/sessions/my-recent")
        .header(header::COOKIE, "__session=valid-token")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn lowercase_bearer_scheme_authenticates() {
    let h = harness(&[]);
    let req = Request::builder()
        .uri("/api/chat/threads")
        .header(header::AUTHORIZATION, "bearer valid-token")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"], "user_42");
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
    let h = harness(&[]);
    for path in ["/dashboard", "/api/chatty", "/api"] {
        let resp = h.app.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body_json(resp).await["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn health_routes_only_answer_reads() {
    let h = harness(&[]);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let h = harness(&[]);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer valid-token")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(h.sessions.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let h = harness(&[("BODY_LIMIT_BYTES", "1024")]);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/chat/message")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(vec![b'a'; 4096]))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn event_bridge_relays_payload_and_function_table() {
    let h = harness(&[]);
    let req = Request::builder()
        .method(Method::PUT)
        .uri("/api/event-bridge?fnId=sync-user")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer valid-token")
        .body(Body::from(r#"{"event":{"name":"clerk/user.created"}}"#))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["ok"], true);

    let calls = h.runtime.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (inv, functions) = &calls[0];
    assert_eq!(inv.method, "PUT");
    assert_eq!(inv.path, "/api/event-bridge");
    assert_eq!(inv.query.as_deref(), Some("fnId=sync-user"));
    assert_eq!(&inv.body[..], br#"{"event":{"name":"clerk/user.created"}}"#);
    assert!(inv.json);
    assert!(inv.headers.iter().all(|(k, _)| k != "authorization"));
    assert_eq!(functions, &["sync-user", "delete-user-from-db"]);
}

#[tokio::test]
async fn event_bridge_relays_exact_body_bytes() {
    let h = harness(&[]);
    let src = r#"{"z":1,"a":2,"id":12345678901234567890123}"#;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/event-bridge")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-inngest-signature", "t=1&s=abc")
        .body(Body::from(src))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = h.runtime.calls.lock().unwrap();
    let (inv, _) = &calls[0];
    assert_eq!(&inv.body[..], src.as_bytes());
    assert_eq!(inv.header("x-inngest-signature"), Some("t=1&s=abc"));
    match inv.payload() {
        codeconnect_gateway::bridge::Payload::Json(raw) => assert_eq!(raw.get(), src),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn event_bridge_relays_non_utf8_body() {
    let h = harness(&[]);
    let src: &[u8] = &[0x80, 0x81, b'{', 0xff];
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/event-bridge")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(src.to_vec()))
        .unwrap();
    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = h.runtime.calls.lock().unwrap();
    let (inv, _) = &calls[0];
    assert_eq!(&inv.body[..], src);
    assert_eq!(inv.payload().encoding(), "base64");
}

#[tokio::test]
async fn runtime_failure_is_contained() {
    let app = common::app_with_runtime(std::sync::Arc::new(common::DownRuntime));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/event-bridge")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "BAD_GATEWAY");
    assert!(!body["error"]["msg"].as_str().unwrap().contains("refused"));

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
