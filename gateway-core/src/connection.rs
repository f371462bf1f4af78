// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Connection
//!
//! Owns the account credentials, the sender's private key and one reusable
//! HTTP session.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> gateway_core::GatewayResult<()> {
//! use gateway_core::{Connection, LookupMode};
//!
//! let conn = Connection::builder("*YOUR_ID", "your-gateway-secret")
//!     .key_str("private:YOUR_PRIVATE_KEY")
//!     .verify_fingerprint()
//!     .build()?;
//!
//! let id = conn.get_id(&LookupMode::Email("test@example.com".into())).await?;
//! let public_key = conn.get_public_key(&id).await?;
//! # let _ = public_key;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::key::{first_line, read_first_line, PrivateKey};
use crate::pinning::{pinned_tls_config, Fingerprint};

/// A connection to the gateway for one API identity.
///
/// The HTTP session is opened on construction and released by
/// [`close`](Connection::close) or when the connection is dropped, whichever
/// comes first. Requests on a closed connection fail with
/// [`GatewayError::Closed`].
///
/// Requests borrow the connection immutably and may run concurrently on the
/// shared session. Replacing the key or closing needs `&mut self`, so neither
/// can overlap an in-flight request.
pub struct Connection {
    id: String,
    secret: String,
    key: Option<PrivateKey>,
    key_file: Option<PathBuf>,
    base_url: Url,
    config: ConnectionConfig,
    session: Option<Client>,
}

impl Connection {
    /// Opens a connection to the production gateway with default settings.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> GatewayResult<Self> {
        Self::with_config(id, secret, ConnectionConfig::default())
    }

    /// Opens a connection using `config`.
    pub fn with_config(
        id: impl Into<String>,
        secret: impl Into<String>,
        config: ConnectionConfig,
    ) -> GatewayResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "invalid base URL: {}",
                config.base_url
            )));
        }

        let session = open_session(&config)?;
        let id = id.into();
        debug!(%id, base_url = %base_url, "opened gateway session");

        Ok(Connection {
            id,
            secret: secret.into(),
            key: None,
            key_file: None,
            base_url,
            config,
            session: Some(session),
        })
    }

    /// Starts building a connection.
    pub fn builder(id: impl Into<String>, secret: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder::new(id, secret)
    }

    /// The API identity requests are sent from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Releases the HTTP session. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(id = %self.id, "released gateway session");
        }
    }

    /// Returns `true` once the session has been released.
    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    pub(crate) fn session(&self) -> GatewayResult<&Client> {
        self.session.as_ref().ok_or(GatewayError::Closed)
    }

    /// The sender's private key.
    ///
    /// Fails with [`GatewayError::KeyNotSet`] if no key has been configured.
    pub fn key(&self) -> GatewayResult<&PrivateKey> {
        self.key.as_ref().ok_or(GatewayError::KeyNotSet)
    }

    /// Sets or clears the sender's private key.
    ///
    /// Forgets any previously recorded key file.
    pub fn set_key(&mut self, key: Option<PrivateKey>) {
        self.key = key;
        self.key_file = None;
    }

    /// Sets the key from its `private:<hex>` encoding, or clears it with `None`.
    ///
    /// On a decoding error the current key is left untouched.
    pub fn set_key_str(&mut self, encoded: Option<&str>) -> GatewayResult<()> {
        let key = encoded.map(PrivateKey::decode).transpose()?;
        self.set_key(key);
        Ok(())
    }

    /// Loads the key from the first line of `path`, or clears it with `None`.
    ///
    /// The path is recorded and available through
    /// [`key_file`](Connection::key_file). On any error the current key and
    /// path are left untouched.
    pub fn set_key_file(&mut self, path: Option<&Path>) -> GatewayResult<()> {
        let Some(path) = path else {
            self.set_key(None);
            return Ok(());
        };

        let line = read_first_line(path).map_err(|source| GatewayError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        let key = PrivateKey::decode(first_line(&line))?;

        self.key = Some(key);
        self.key_file = Some(path.to_path_buf());
        Ok(())
    }

    /// The file the current key was loaded from, if any.
    pub fn key_file(&self) -> Option<&Path> {
        self.key_file.as_deref()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("key_file", &self.key_file)
            .field("base_url", &self.base_url.as_str())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Builds the HTTP session, pinning the certificate if configured.
fn open_session(config: &ConnectionConfig) -> GatewayResult<Client> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &config.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    match config.effective_fingerprint() {
        Some(fingerprint) => {
            if config.uses_default_fingerprint() {
                warn!(
                    "pinning the built-in gateway certificate fingerprint; \
                     it stops working once the certificate is rotated, pass an explicit fingerprint"
                );
            }
            let tls = pinned_tls_config(fingerprint, &config.root_certificates)?;
            builder = builder.use_preconfigured_tls(tls);
        }
        None => {
            for der in &config.root_certificates {
                builder = builder.add_root_certificate(reqwest::Certificate::from_der(der)?);
            }
        }
    }

    Ok(builder.build()?)
}

/// Where the builder takes the private key from.
enum KeySource {
    None,
    Key(PrivateKey),
    Encoded(String),
    File(PathBuf),
}

/// Builder for [`Connection`].
///
/// If several key sources are given, the last one wins.
pub struct ConnectionBuilder {
    id: String,
    secret: String,
    config: ConnectionConfig,
    key: KeySource,
}

impl ConnectionBuilder {
    /// Creates a new builder with default configuration.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        ConnectionBuilder {
            id: id.into(),
            secret: secret.into(),
            config: ConnectionConfig::default(),
            key: KeySource::None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the gateway base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(url);
        self
    }

    /// Pins the server certificate to `fingerprint`.
    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.config = self.config.with_fingerprint(fingerprint);
        self
    }

    /// Pins the server certificate to the built-in fingerprint unless one is set.
    pub fn verify_fingerprint(mut self) -> Self {
        self.config = self.config.with_fingerprint_verification();
        self
    }

    /// Uses an already decoded private key.
    pub fn key(mut self, key: PrivateKey) -> Self {
        self.key = KeySource::Key(key);
        self
    }

    /// Uses a `private:<hex>` encoded private key.
    pub fn key_str(mut self, encoded: impl Into<String>) -> Self {
        self.key = KeySource::Encoded(encoded.into());
        self
    }

    /// Reads the private key from the first line of a file.
    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = KeySource::File(path.into());
        self
    }

    /// Opens the connection.
    pub fn build(self) -> GatewayResult<Connection> {
        let mut conn = Connection::with_config(self.id, self.secret, self.config)?;
        match self.key {
            KeySource::None => {}
            KeySource::Key(key) => conn.set_key(Some(key)),
            KeySource::Encoded(encoded) => conn.set_key_str(Some(&encoded))?,
            KeySource::File(path) => conn.set_key_file(Some(path.as_path()))?,
        }
        Ok(conn)
    }
}
