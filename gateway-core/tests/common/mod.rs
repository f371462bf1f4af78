// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Mock gateway helpers shared by the integration tests.

#![allow(dead_code)]

use gateway_core::Connection;
use mockito::{Matcher, ServerGuard};
use tracing_subscriber::EnvFilter;

pub const ID: &str = "*MOCKING";
pub const SECRET: &str = "mock";

/// Public key of `ECHOECHO` as served by the mock gateway.
pub const ECHOECHO_KEY: &str = "4a6a1b34dcef15d43cb74de2fd36091be99fbbaf126d099d47d83d919712c72b";

/// Routes library logs to the test output; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Matches the default `from`/`secret` pair in a query string or form body.
pub fn credentials() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("from".into(), ID.into()),
        Matcher::UrlEncoded("secret".into(), SECRET.into()),
    ])
}

/// Opens a connection against `server`.
pub fn connect(server: &ServerGuard) -> Connection {
    init_tracing();
    Connection::builder(ID, SECRET)
        .base_url(server.url())
        .build()
        .expect("connection to mock gateway")
}
