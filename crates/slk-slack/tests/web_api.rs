//! Web API tests against a mock Slack server.

use serde_json::json;
use slk_core::directory::ChannelKind;
use slk_core::remote::{self, ChannelQuery, RemoteClient, RemoteError};
use slk_slack::{SlackClient, SlackCredentials};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn client(server: &MockServer) -> SlackClient {
    SlackClient::with_base_url(
        SlackCredentials {
            token: "xoxc-test".to_string(),
            cookie: "cookie-value".to_string(),
        },
        server.uri(),
    )
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    let mut body = body;
    body["ok"] = json!(true);
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_requests_carry_token_and_cookie() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users.list"))
        .and(header("authorization", "Bearer xoxc-test"))
        .and(header("cookie", "d=cookie-value"))
        .respond_with(ok(json!({
            "members": [
                {
                    "id": "U1",
                    "name": "alice",
                    "real_name": "Alice",
                    "profile": { "email": "a@x.io", "title": "Eng" }
                },
                { "id": "U2", "name": "old", "deleted": true }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).get_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].real_name, "Alice");
    assert!(users[1].deleted);
}

#[tokio::test]
async fn test_channel_listing_follows_cursor() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations.list"))
        .and(query_param("cursor", "next-page"))
        .respond_with(ok(json!({
            "channels": [{ "id": "D1", "is_im": true, "user": "U2" }],
            "response_metadata": { "next_cursor": "" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations.list"))
        .and(query_param("limit", "1000"))
        .and(query_param("types", "public_channel,private_channel,im,mpim"))
        .and(query_param("exclude_archived", "true"))
        .respond_with(ok(json!({
            "channels": [{ "id": "C1", "name": "general", "is_member": true, "num_members": 4 }],
            "response_metadata": { "next_cursor": "next-page" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.get_channels(ChannelQuery::default()).await.unwrap();
    assert_eq!(first.next_cursor.as_deref(), Some("next-page"));

    let channels = remote::load_channels(&client).await.unwrap();
    assert_eq!(channels.len(), 2);
    assert_eq!(channels["C1"].name, "general");
    assert_eq!(channels["D1"].kind, ChannelKind::DirectMessage);
}

#[tokio::test]
async fn test_history_is_returned_oldest_first() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations.history"))
        .and(query_param("channel", "C1"))
        .and(query_param("limit", "100"))
        .respond_with(ok(json!({
            "messages": [
                { "ts": "1700000060.000200", "user": "U1", "text": "second" },
                { "ts": "1700000000.000100", "user": "U2", "text": "first" }
            ]
        })))
        .mount(&server)
        .await;

    let history = client(&server).get_history("C1", 100).await.unwrap();
    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_post_and_mark_send_json_bodies() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(body_json(json!({ "channel": "C1", "text": "hello", "as_user": true })))
        .respond_with(ok(json!({ "ts": "1.0" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/conversations.mark"))
        .and(body_json(json!({ "channel": "C1", "ts": "1.0" })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.post_message("C1", "hello").await.unwrap();
    client.mark_read("C1", "1.0").await.unwrap();
}

#[tokio::test]
async fn test_api_error_code_is_reported() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rtm.connect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "invalid_auth" })),
        )
        .mount(&server)
        .await;

    let err = match client(&server).connect().await {
        Ok(_) => panic!("connect should fail"),
        Err(err) => err,
    };
    assert_eq!(err, RemoteError::Api("invalid_auth".to_string()));
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users.list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).get_users().await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(msg) if msg.contains("500")));
}
