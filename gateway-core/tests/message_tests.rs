// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message Integration Tests
//!
//! Simple and end-to-end submission against a mock gateway.

mod common;

use common::{connect, credentials, SECRET};
use gateway_core::{Endpoint, ServerErrorKind};
use mockito::{Matcher, Server};

#[tokio::test]
async fn test_send_simple() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/send_simple")
        .match_header(
            "content-type",
            Matcher::Regex("application/x-www-form-urlencoded".into()),
        )
        .match_body(Matcher::AllOf(vec![
            credentials(),
            Matcher::UrlEncoded("to".into(), "ECHOECHO".into()),
            Matcher::UrlEncoded("text".into(), "Hello & welcome".into()),
        ]))
        .with_body("1234567890abcdef")
        .create_async()
        .await;

    let conn = connect(&server);
    let id = conn
        .send_simple([("to", "ECHOECHO"), ("text", "Hello & welcome")])
        .await
        .unwrap();

    assert_eq!(id, "1234567890abcdef");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_e2e() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/send_e2e")
        .match_body(Matcher::AllOf(vec![
            credentials(),
            Matcher::UrlEncoded("to".into(), "ECHOECHO".into()),
            Matcher::UrlEncoded("nonce".into(), "00112233".into()),
            Matcher::UrlEncoded("box".into(), "deadbeef".into()),
        ]))
        .with_body("fedcba0987654321")
        .create_async()
        .await;

    let conn = connect(&server);
    let fields = vec![
        ("to".to_string(), "ECHOECHO".to_string()),
        ("nonce".to_string(), "00112233".to_string()),
        ("box".to_string(), "deadbeef".to_string()),
    ];
    let id = conn.send_e2e(fields).await.unwrap();

    assert_eq!(id, "fedcba0987654321");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_keeps_caller_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/send_simple")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from".into(), "*OTHERID".into()),
            Matcher::UrlEncoded("secret".into(), SECRET.into()),
            Matcher::UrlEncoded("to".into(), "ECHOECHO".into()),
        ]))
        .with_body("0011223344556677")
        .create_async()
        .await;

    let conn = connect(&server);
    conn.send_simple([("from", "*OTHERID"), ("to", "ECHOECHO"), ("text", "hi")])
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_error_statuses() {
    let cases = [
        (400, ServerErrorKind::ClientError),
        (401, ServerErrorKind::Unauthorized),
        (402, ServerErrorKind::NoCredits),
        (404, ServerErrorKind::NotFound),
        (413, ServerErrorKind::TooLarge),
        (500, ServerErrorKind::ServerError),
    ];

    let mut server = Server::new_async().await;
    let conn = connect(&server);

    for (status, kind) in cases {
        let mock = server
            .mock("POST", "/send_e2e")
            .with_status(status)
            .create_async()
            .await;

        let err = conn.send_e2e([("to", "ECHOECHO")]).await.unwrap_err();
        let server_err = err.server_error().expect("server error");
        assert_eq!(server_err.endpoint, Endpoint::Message, "status {}", status);
        assert_eq!(server_err.kind, kind, "status {}", status);
        assert_eq!(server_err.status, status as u16);

        mock.remove_async().await;
    }
}

#[tokio::test]
async fn test_send_message_too_long_description() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/send_simple")
        .with_status(413)
        .with_body("too long")
        .create_async()
        .await;

    let conn = connect(&server);
    let err = conn
        .send_simple([("to", "ECHOECHO"), ("text", "x")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Message is too long"));
}
