// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key Material
//!
//! Curve25519 keys and their text encoding.
//!
//! Keys are exchanged as `<type>:<hex>` strings, for example
//! `private:4a6a...c72b` or `public:4a6a...c72b`, where the hex part is the
//! 32 raw key bytes.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use rand::rngs::OsRng;
use thiserror::Error;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

/// Length of a raw Curve25519 key in bytes.
pub const KEY_LENGTH: usize = 32;

/// The two kinds of encoded keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Private key of the local account.
    Private,
    /// Public key of a remote identity.
    Public,
}

impl KeyType {
    /// Prefix used in the text encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Private => "private",
            KeyType::Public => "public",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid key encoding: missing type prefix")]
    MissingPrefix,

    #[error("Invalid key type: expected {expected}, got {actual}")]
    WrongType { expected: KeyType, actual: String },

    #[error("Invalid key hex: {0}")]
    InvalidHex(String),

    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Private key of the sending account.
///
/// The secret is zeroized when dropped and never shows up in `Debug` output.
#[derive(Clone)]
pub struct PrivateKey {
    secret: StaticSecret,
}

impl PrivateKey {
    /// Creates a private key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        PrivateKey {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Generates a new random private key.
    pub fn generate() -> Self {
        PrivateKey {
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Decodes a `private:<hex>` string.
    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        let bytes = decode_typed(encoded, KeyType::Private)?;
        Ok(PrivateKey::from_bytes(*bytes))
    }

    /// Encodes the key as `private:<hex>`.
    pub fn encode(&self) -> String {
        format!("{}:{}", KeyType::Private, hex::encode(self.secret.as_bytes()))
    }

    /// Returns the raw key bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEY_LENGTH]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Derives the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(x25519_dalek::PublicKey::from(&self.secret).to_bytes())
    }

    /// Borrows the underlying secret for payload cryptography done by the caller.
    pub fn as_secret(&self) -> &StaticSecret {
        &self.secret
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret.as_bytes() == other.secret.as_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// Public key of a remote identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; KEY_LENGTH],
}

impl PublicKey {
    /// Creates a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        PublicKey { bytes }
    }

    /// Parses bare hex without a type prefix, as returned by the key lookup.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(hex_str.trim())?;
        Ok(PublicKey::from_bytes(*bytes))
    }

    /// Decodes a `public:<hex>` string.
    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        let bytes = decode_typed(encoded, KeyType::Public)?;
        Ok(PublicKey::from_bytes(*bytes))
    }

    /// Encodes the key as `public:<hex>`.
    pub fn encode(&self) -> String {
        format!("{}:{}", KeyType::Public, self.to_hex())
    }

    /// Returns the bare hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }

    /// Converts into a key usable with `x25519-dalek`.
    pub fn to_x25519(&self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.bytes)
    }
}

/// Keys that can be loaded from their text encoding.
pub trait DecodeKey: Sized {
    /// Decodes the `<type>:<hex>` text form.
    fn decode_str(encoded: &str) -> Result<Self, KeyError>;
}

impl DecodeKey for PrivateKey {
    fn decode_str(encoded: &str) -> Result<Self, KeyError> {
        PrivateKey::decode(encoded)
    }
}

impl DecodeKey for PublicKey {
    fn decode_str(encoded: &str) -> Result<Self, KeyError> {
        PublicKey::decode(encoded)
    }
}

/// Decodes an encoded key, or reads it from a file if `value` names one.
///
/// A readable file contributes its first line (whitespace-trimmed); anything
/// else is treated as the encoded key itself.
pub fn read_key_or_key_file<K: DecodeKey>(value: &str) -> Result<K, KeyError> {
    match read_first_line(Path::new(value)) {
        Ok(line) => K::decode_str(first_line(&line)),
        Err(_) => K::decode_str(value),
    }
}

/// Reads the first line of the file at `path`; later lines are never read.
pub(crate) fn read_first_line(path: &Path) -> io::Result<String> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line)
}

/// Returns the first line of `contents` with surrounding whitespace removed.
pub(crate) fn first_line(contents: &str) -> &str {
    contents.lines().next().unwrap_or("").trim()
}

fn decode_typed(encoded: &str, expected: KeyType) -> Result<Zeroizing<[u8; KEY_LENGTH]>, KeyError> {
    let (prefix, key_hex) = encoded.split_once(':').ok_or(KeyError::MissingPrefix)?;
    if prefix != expected.as_str() {
        return Err(KeyError::WrongType {
            expected,
            actual: prefix.to_string(),
        });
    }
    decode_hex(key_hex)
}

fn decode_hex(key_hex: &str) -> Result<Zeroizing<[u8; KEY_LENGTH]>, KeyError> {
    let raw = Zeroizing::new(hex::decode(key_hex).map_err(|e| KeyError::InvalidHex(e.to_string()))?);
    if raw.len() != KEY_LENGTH {
        return Err(KeyError::InvalidLength(raw.len()));
    }
    let mut bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    bytes.copy_from_slice(&raw);
    Ok(bytes)
}
