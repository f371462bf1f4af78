// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for gateway connections

use std::time::Duration;

use crate::pinning::Fingerprint;

/// Production gateway base URL.
pub const MSGAPI_URL: &str = "https://msgapi.threema.ch";

/// Configuration for a gateway connection's transport session
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the gateway API (no trailing slash)
    pub base_url: String,

    /// Pin the server certificate by fingerprint
    pub verify_fingerprint: bool,

    /// Fingerprint to pin; always pinned when set
    pub fingerprint: Option<Fingerprint>,

    /// HTTP timeout handed to the transport (none by default)
    pub timeout: Option<Duration>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Proxy every request goes through (`http://`, `https://` or `socks5://`)
    pub proxy_url: Option<String>,

    /// DER certificates trusted as roots in addition to the built-in ones
    pub root_certificates: Vec<Vec<u8>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: MSGAPI_URL.to_string(),
            verify_fingerprint: false,
            fingerprint: None,
            timeout: None,
            user_agent: concat!("gateway-core/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy_url: None,
            root_certificates: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    /// Pin the server certificate to `fingerprint`
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self.verify_fingerprint = true;
        self
    }

    /// Pin the server certificate, using the built-in fingerprint unless one is set
    pub fn with_fingerprint_verification(mut self) -> Self {
        self.verify_fingerprint = true;
        self
    }

    /// Point the connection at a different gateway (e.g. a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reach the gateway through a proxy, e.g. when the host has no direct
    /// route to `msgapi.threema.ch`
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Trust a DER-encoded root certificate, e.g. for a gateway behind a
    /// private CA. The certificate pin, if any, still applies.
    pub fn with_root_certificate(mut self, der: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(der.into());
        self
    }

    /// Set the transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The fingerprint the session will pin, if any.
    ///
    /// An explicit fingerprint is always pinned. Without one, the built-in
    /// fingerprint is used when verification is requested.
    pub fn effective_fingerprint(&self) -> Option<Fingerprint> {
        match (&self.fingerprint, self.verify_fingerprint) {
            (Some(fingerprint), _) => Some(fingerprint.clone()),
            (None, true) => Some(Fingerprint::gateway_default()),
            (None, false) => None,
        }
    }

    /// Returns `true` if the session will rely on the built-in fingerprint.
    pub fn uses_default_fingerprint(&self) -> bool {
        self.fingerprint.is_none() && self.verify_fingerprint
    }
}
