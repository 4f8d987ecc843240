//! Chat client protocol tests: login against a mock HTTP endpoint, and a
//! full websocket session against a loopback server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oldnet::commands::chat::{ChatError, ClientPacket, LoginInfo, connect, login};
use oldnet::screen::{Cancelled, Screen};

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Login (HTTP)
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(query_param("username", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "ada",
            "token": "tok123",
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let info = login(&client, &server.uri(), "ada").await.unwrap();
    assert_eq!(
        info,
        LoginInfo {
            username: "ada".to_string(),
            token: "tok123".to_string(),
        }
    );
}

#[tokio::test]
async fn test_login_renames_anonymous_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "Anonymous-1337",
            "token": "tok",
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let info = login(&client, &server.uri(), "Anonymous").await.unwrap();
    assert_eq!(info.username, "Anonymous-1337");
}

#[tokio::test]
async fn test_login_failure_carries_server_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("username taken\n"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = login(&client, &server.uri(), "ada").await.unwrap_err();
    match err {
        ChatError::Http { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "username taken");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

// ============================================================================
// Websocket session (loopback server)
// ============================================================================

#[tokio::test]
async fn test_session_prints_incoming_and_sends_outgoing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();

        socket
            .send(Message::text(
                r#"{"messages":[{"type":"userMessage","timestamp":0,"sender":"bob","message":"hello there"}]}"#,
            ))
            .await
            .unwrap();

        // Expect exactly one text packet back from the client.
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(raw))) => break raw.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended early: {other:?}"),
            }
        }
    });

    let screen = Screen::with_print_delay(0);
    let conn = connect(&format!("ws://{addr}/"), "tok", screen.clone(), true)
        .await
        .unwrap();

    conn.send(&ClientPacket::SendMessage {
        data: "hi bob".to_string(),
    })
    .await
    .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received, r#"{"type":"sendMessage","data":"hi bob"}"#);

    {
        let screen = screen.clone();
        wait_until(move || screen.transcript().contains("<bob>: hello there")).await;
    }

    conn.close().await;
    {
        let screen = screen.clone();
        wait_until(move || screen.transcript().contains("Connection closed.")).await;
    }
}

#[tokio::test]
async fn test_muted_connection_drops_backlog() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        socket
            .send(Message::text(
                r#"{"messages":[{"type":"serverMessage","timestamp":0,"message":"backlog"}]}"#,
            ))
            .await
            .unwrap();
        // Hold the socket open until the client hangs up.
        while let Some(Ok(_)) = socket.next().await {}
    });

    let screen = Screen::with_print_delay(0);
    let conn = connect(&format!("ws://{addr}/"), "tok", screen.clone(), false)
        .await
        .unwrap();

    // Give the reader a chance to (not) print the muted backlog.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!screen.transcript().contains("backlog"));

    conn.close().await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_close_cancels_pending_prompt() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        // Wait for the client's signal, then hang up.
        match socket.next().await {
            Some(Ok(Message::Text(_))) => {}
            other => panic!("expected a text frame, got {other:?}"),
        }
        socket.close(None).await.unwrap();
    });

    let screen = Screen::with_print_delay(0);
    let conn = connect(&format!("ws://{addr}/"), "tok", screen.clone(), true)
        .await
        .unwrap();

    // The chat loop's read is pending when the server goes away.
    let read = screen.prompt("me> ");
    conn.send(&ClientPacket::SendMessage {
        data: "ping".to_string(),
    })
    .await
    .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("prompt was never cancelled");
    assert_eq!(result, Err(Cancelled));
    assert!(screen.transcript().contains("Connection closed."));

    server.await.unwrap();
    conn.close().await;
}
