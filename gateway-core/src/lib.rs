// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Core Library
//!
//! Client for the end-to-end encrypted message gateway HTTP API.
//!
//! A [`Connection`] authenticates an API identity with its secret, optionally
//! holds the identity's private key, and talks to the gateway over one
//! (optionally certificate-pinned) HTTP session:
//! - public key, ID and reception capability lookups
//! - credit balance
//! - simple and end-to-end message submission
//! - blob upload and download
//!
//! Message payload encryption is not done here; end-to-end payloads are
//! built by the caller and posted as opaque form fields.

mod api;
pub mod config;
pub mod connection;
mod dispatch;
pub mod error;
pub mod key;
pub mod lookup;
pub mod pinning;

pub use config::{ConnectionConfig, MSGAPI_URL};
pub use connection::{Connection, ConnectionBuilder};
pub use dispatch::{into_params, Params, BLOB_FIELD};
pub use error::{Endpoint, GatewayError, GatewayResult, ServerError, ServerErrorKind};
pub use key::{read_key_or_key_file, DecodeKey, KeyError, KeyType, PrivateKey, PublicKey};
pub use lookup::{parse_capabilities, LookupMode, ReceptionCapability};
pub use pinning::{Fingerprint, PinnedCertVerifier, PinningError, DEFAULT_FINGERPRINT};

/// Gateway API feature level implemented by this client.
pub const FEATURE_LEVEL: u32 = 3;
