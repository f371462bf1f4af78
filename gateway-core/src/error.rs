// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! Unified error type for gateway operations, plus the per-endpoint server
//! error families produced from non-200 responses.

use std::fmt;
use std::path::PathBuf;

use reqwest::Response;
use thiserror::Error;

use crate::key::KeyError;
use crate::pinning::PinningError;

/// Endpoint category a server error belongs to.
///
/// Each category is its own error family; the same status code can mean
/// different things depending on which endpoint returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Public key lookup.
    PublicKey,
    /// Identity lookup by phone, email or their hashes.
    IdLookup,
    /// Reception capability lookup.
    ReceptionCapabilities,
    /// Credit balance query.
    Credits,
    /// Simple and end-to-end message submission.
    Message,
    /// Blob upload and download.
    Blob,
}

impl Endpoint {
    fn name(&self) -> &'static str {
        match self {
            Endpoint::PublicKey => "public key lookup",
            Endpoint::IdLookup => "ID lookup",
            Endpoint::ReceptionCapabilities => "reception capabilities lookup",
            Endpoint::Credits => "credits query",
            Endpoint::Message => "message send",
            Endpoint::Blob => "blob transfer",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status-driven member of a server error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerErrorKind {
    /// 401/403: API identity or secret rejected.
    Unauthorized,
    /// 402: no credits left on the account.
    NoCredits,
    /// 404: unknown identity, contact or blob.
    NotFound,
    /// 413: message or blob too large.
    TooLarge,
    /// Any other 4xx.
    ClientError,
    /// 5xx.
    ServerError,
    /// Anything else that is not 200.
    Unexpected,
}

impl ServerErrorKind {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ServerErrorKind::Unauthorized,
            402 => ServerErrorKind::NoCredits,
            404 => ServerErrorKind::NotFound,
            413 => ServerErrorKind::TooLarge,
            400..=499 => ServerErrorKind::ClientError,
            500..=599 => ServerErrorKind::ServerError,
            _ => ServerErrorKind::Unexpected,
        }
    }
}

/// A non-200 response from a gateway endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// Error family.
    pub endpoint: Endpoint,
    /// Family member selected by the status code.
    pub kind: ServerErrorKind,
    /// HTTP status code.
    pub status: u16,
}

impl ServerError {
    /// Creates the family member for `status`.
    pub fn new(endpoint: Endpoint, status: u16) -> Self {
        ServerError {
            endpoint,
            kind: ServerErrorKind::from_status(status),
            status,
        }
    }

    /// The gateway's explanation for this status on this endpoint.
    pub fn description(&self) -> &'static str {
        match (self.endpoint, self.status) {
            (_, 401) => "API identity or secret incorrect",
            (_, 500) => "A temporary internal server error occurred",
            (Endpoint::PublicKey | Endpoint::IdLookup | Endpoint::ReceptionCapabilities, 404) => {
                "No matching ID found"
            }
            (Endpoint::IdLookup, 400) => "Hash length is wrong",
            (Endpoint::Message, 400) => {
                "Recipient identity is invalid or the account is not set up for the requested mode"
            }
            (Endpoint::Message, 404) => {
                "Recipient phone number or email address could not be found"
            }
            (Endpoint::Message, 413) => "Message is too long",
            (Endpoint::Blob, 400) => "Required parameters are missing or the blob is empty",
            (Endpoint::Blob, 404) => "No matching blob found",
            (Endpoint::Blob, 413) => "Blob is too big",
            (Endpoint::Message | Endpoint::Blob, 402) => "No credits remain",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed with status {}: {}",
            self.endpoint,
            self.status,
            self.description()
        )
    }
}

impl std::error::Error for ServerError {}

/// Unified error type for gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Private key read before one was configured.
    #[error("sender's private key not specified")]
    KeyNotSet,

    /// Encoded key could not be decoded.
    #[error("invalid key: {0}")]
    KeyFormat(#[from] KeyError),

    /// Key file could not be read.
    #[error("cannot read key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Identity lookup mode rejected before any request was sent.
    #[error("invalid lookup: {0}")]
    InvalidLookup(String),

    /// Reception capabilities response contained an unknown token.
    #[error("invalid reception capability: {0}")]
    InvalidCapability(String),

    /// Successful response whose body could not be interpreted.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// Endpoint returned a non-200 status.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Certificate pinning could not be configured.
    #[error("pinning error: {0}")]
    Pinning(#[from] PinningError),

    /// Transport failure (connection refused, TLS rejected, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Connection settings are unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The connection's session has been released.
    #[error("connection closed")]
    Closed,
}

impl GatewayError {
    /// The server error, if this is one.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            GatewayError::Server(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status code of a server error.
    pub fn status(&self) -> Option<u16> {
        self.server_error().map(|err| err.status)
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Turns a non-200 response into the `endpoint` family's error.
///
/// The body is drained first so the pooled connection is released.
pub(crate) async fn classify(response: Response, endpoint: Endpoint) -> GatewayError {
    let status = response.status().as_u16();
    let drained = response.bytes().await.map(|body| body.len());
    tracing::debug!(%endpoint, status, ?drained, "gateway returned error status");
    GatewayError::Server(ServerError::new(endpoint, status))
}
