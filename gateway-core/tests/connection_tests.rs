// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Integration Tests
//!
//! Session lifecycle, raw requests and key sources.

mod common;

use std::io::Write;

use common::{connect, credentials, init_tracing, ID, SECRET};
use gateway_core::{into_params, Connection, GatewayError, Params, PrivateKey};
use mockito::{Matcher, Server};
use tempfile::NamedTempFile;

const ECHOECHO_PRIVATE: &str =
    "private:4a6a1b34dcef15d43cb74de2fd36091be99fbbaf126d099d47d83d919712c72b";

// ============================================================
// Lifecycle
// ============================================================

#[tokio::test]
async fn test_requests_after_close_fail() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut conn = connect(&server);
    conn.close();
    assert!(conn.is_closed());

    assert!(matches!(conn.get_credits().await, Err(GatewayError::Closed)));
    assert!(matches!(
        conn.send_simple([("to", "ECHOECHO")]).await,
        Err(GatewayError::Closed)
    ));
    assert!(matches!(conn.upload("x").await, Err(GatewayError::Closed)));

    conn.close();
    assert!(conn.is_closed());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_drop_releases_session() {
    let server = Server::new_async().await;
    let conn = connect(&server);
    assert!(!conn.is_closed());
    drop(conn);
}

// ============================================================
// Raw requests
// ============================================================

#[tokio::test]
async fn test_raw_get_returns_any_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/custom/path")
        .match_query(Matcher::AllOf(vec![
            credentials(),
            Matcher::UrlEncoded("extra".into(), "1".into()),
        ]))
        .with_status(418)
        .with_body("teapot")
        .create_async()
        .await;

    let conn = connect(&server);
    let response = conn
        .get(&["custom", "path"], into_params([("extra", "1")]))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 418);
    assert_eq!(response.text().await.unwrap(), "teapot");
}

#[tokio::test]
async fn test_raw_get_keeps_caller_from() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/credits")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from".into(), "*OTHERID".into()),
            Matcher::UrlEncoded("secret".into(), SECRET.into()),
        ]))
        .with_body("7")
        .create_async()
        .await;

    let conn = connect(&server);
    let mut params = Params::new();
    params.insert("from".into(), "*OTHERID".into());
    let response = conn.get(&["credits"], params).await.unwrap();

    assert_eq!(response.text().await.unwrap(), "7");
    mock.assert_async().await;
}

// ============================================================
// Key sources
// ============================================================

#[test]
fn test_builder_key_file() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", ECHOECHO_PRIVATE).unwrap();
    writeln!(file, "ignored second line").unwrap();

    let conn = Connection::builder(ID, SECRET)
        .base_url("http://127.0.0.1:9")
        .key_file(file.path())
        .build()
        .unwrap();

    assert_eq!(conn.key().unwrap().encode(), ECHOECHO_PRIVATE);
    assert_eq!(conn.key_file(), Some(file.path()));
}

#[test]
fn test_builder_missing_key_file() {
    init_tracing();
    let result = Connection::builder(ID, SECRET)
        .base_url("http://127.0.0.1:9")
        .key_file("/nonexistent/gateway/key")
        .build();

    assert!(matches!(result, Err(GatewayError::KeyFile { .. })));
}

#[test]
fn test_key_file_with_bad_content() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "public:{}", "00".repeat(32)).unwrap();

    let mut conn = Connection::builder(ID, SECRET)
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();

    assert!(matches!(
        conn.set_key_file(Some(file.path())),
        Err(GatewayError::KeyFormat(_))
    ));
    assert!(conn.key_file().is_none());
    assert!(matches!(conn.key(), Err(GatewayError::KeyNotSet)));
}

#[test]
fn test_key_replaced_and_cleared() {
    init_tracing();
    let mut conn = Connection::builder(ID, SECRET)
        .base_url("http://127.0.0.1:9")
        .key_str(ECHOECHO_PRIVATE)
        .build()
        .unwrap();
    assert_eq!(conn.key().unwrap().encode(), ECHOECHO_PRIVATE);

    let fresh = PrivateKey::generate();
    let expected = fresh.encode();
    conn.set_key(Some(fresh));
    assert_eq!(conn.key().unwrap().encode(), expected);

    conn.set_key(None);
    assert!(matches!(conn.key(), Err(GatewayError::KeyNotSet)));
}
