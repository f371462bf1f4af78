// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Certificate Pinning
//!
//! Pins the gateway's TLS certificate by a fingerprint of its DER encoding.
//! The fingerprint algorithm follows from its length: 16 bytes is MD5,
//! 20 bytes is SHA-1 and 32 bytes is SHA-256.
//!
//! The pin is checked on top of normal WebPKI validation: the chain must
//! lead to a trusted root, be valid at the current time and name the host
//! before the fingerprint is compared. Either check failing aborts the
//! handshake.

use std::sync::Arc;

use md5::{Digest, Md5};
use ring::digest;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use thiserror::Error;

/// Fingerprint of the gateway certificate at the time of writing.
///
/// Only valid until the gateway rotates its certificate. Pass an explicit
/// fingerprint for anything long-lived.
pub const DEFAULT_FINGERPRINT: [u8; 16] = [
    0x6d, 0x7f, 0xa3, 0x1d, 0x80, 0xdc, 0x56, 0xf9, 0xc1, 0xed, 0x17, 0x98, 0x2a, 0xd6, 0x01,
    0x7f,
];

/// Pinning configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinningError {
    #[error("Invalid fingerprint length: {0} bytes (expected 16, 20 or 32)")]
    InvalidLength(usize),

    #[error("Invalid root certificate: {0}")]
    InvalidRoot(String),

    #[error("TLS configuration failed: {0}")]
    TlsConfig(String),
}

/// A pinned certificate fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// MD5 of the DER certificate.
    Md5([u8; 16]),
    /// SHA-1 of the DER certificate.
    Sha1([u8; 20]),
    /// SHA-256 of the DER certificate.
    Sha256([u8; 32]),
}

impl Fingerprint {
    /// Creates a fingerprint from raw digest bytes, picking the algorithm by length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PinningError> {
        match bytes.len() {
            16 => {
                let mut fp = [0u8; 16];
                fp.copy_from_slice(bytes);
                Ok(Fingerprint::Md5(fp))
            }
            20 => {
                let mut fp = [0u8; 20];
                fp.copy_from_slice(bytes);
                Ok(Fingerprint::Sha1(fp))
            }
            32 => {
                let mut fp = [0u8; 32];
                fp.copy_from_slice(bytes);
                Ok(Fingerprint::Sha256(fp))
            }
            len => Err(PinningError::InvalidLength(len)),
        }
    }

    /// The built-in gateway fingerprint.
    pub fn gateway_default() -> Self {
        Fingerprint::Md5(DEFAULT_FINGERPRINT)
    }

    /// Computes the fingerprint of `cert_der` with the same algorithm as `self`.
    pub fn digest_of(&self, cert_der: &[u8]) -> Vec<u8> {
        match self {
            Fingerprint::Md5(_) => Md5::digest(cert_der).to_vec(),
            Fingerprint::Sha1(_) => {
                digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, cert_der)
                    .as_ref()
                    .to_vec()
            }
            Fingerprint::Sha256(_) => digest::digest(&digest::SHA256, cert_der).as_ref().to_vec(),
        }
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Fingerprint::Md5(fp) => fp.as_slice(),
            Fingerprint::Sha1(fp) => fp.as_slice(),
            Fingerprint::Sha256(fp) => fp.as_slice(),
        }
    }

    /// Returns `true` if `cert_der` hashes to this fingerprint.
    pub fn matches(&self, cert_der: &[u8]) -> bool {
        self.digest_of(cert_der) == self.as_bytes()
    }
}

/// Mozilla's root store plus `extra_roots` (DER encoded).
pub fn root_store(extra_roots: &[Vec<u8>]) -> Result<RootCertStore, PinningError> {
    let mut roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    for der in extra_roots {
        roots
            .add(CertificateDer::from(der.clone()))
            .map_err(|e| PinningError::InvalidRoot(e.to_string()))?;
    }
    Ok(roots)
}

/// Certificate verifier that requires a valid WebPKI chain for the host
/// and an end-entity certificate matching the pinned fingerprint.
#[derive(Debug)]
pub struct PinnedCertVerifier {
    fingerprint: Fingerprint,
    webpki: Arc<WebPkiServerVerifier>,
}

impl PinnedCertVerifier {
    /// Creates a verifier for `fingerprint` trusting `roots`, using the ring
    /// crypto provider.
    pub fn new(fingerprint: Fingerprint, roots: RootCertStore) -> Result<Self, PinningError> {
        let webpki = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), ring_provider())
            .build()
            .map_err(|e| PinningError::TlsConfig(e.to_string()))?;
        Ok(PinnedCertVerifier {
            fingerprint,
            webpki,
        })
    }

    /// The pinned fingerprint.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let verified = self.webpki.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        )?;

        if self.fingerprint.matches(end_entity.as_ref()) {
            Ok(verified)
        } else {
            tracing::warn!(
                server = ?server_name,
                "server certificate does not match pinned fingerprint"
            );
            Err(rustls::Error::General(
                "certificate fingerprint mismatch".to_string(),
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.webpki.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.webpki.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.webpki.supported_verify_schemes()
    }
}

fn ring_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Builds a rustls client configuration that trusts `extra_roots` in
/// addition to the built-in roots and pins `fingerprint`.
pub fn pinned_tls_config(
    fingerprint: Fingerprint,
    extra_roots: &[Vec<u8>],
) -> Result<ClientConfig, PinningError> {
    let verifier = PinnedCertVerifier::new(fingerprint, root_store(extra_roots)?)?;

    let config = ClientConfig::builder_with_provider(ring_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| PinningError::TlsConfig(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(config)
}
