// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway API
//!
//! Typed operations on top of the request dispatcher. Each operation maps a
//! non-200 response to its own [`Endpoint`] error family.

use std::collections::HashSet;

use reqwest::Response;

use crate::connection::Connection;
use crate::dispatch::into_params;
use crate::error::{Endpoint, GatewayError, GatewayResult};
use crate::key::PublicKey;
use crate::lookup::{parse_capabilities, LookupMode, ReceptionCapability};

impl Connection {
    /// Looks up the public key of a gateway ID.
    pub async fn get_public_key(&self, id: &str) -> GatewayResult<PublicKey> {
        let response = self.get_ok(&["pubkeys", id], Endpoint::PublicKey).await?;
        let text = response.text().await?;
        Ok(PublicKey::from_hex(&text)?)
    }

    /// Looks up the gateway ID belonging to a phone number, email address or
    /// one of their hashes.
    pub async fn get_id(&self, mode: &LookupMode) -> GatewayResult<String> {
        let response = self
            .get_ok(&["lookup", mode.name(), mode.value()], Endpoint::IdLookup)
            .await?;
        Ok(response.text().await?)
    }

    /// Like [`get_id`](Connection::get_id), with the mode given as
    /// `(name, value)` pairs.
    ///
    /// Anything but exactly one pair with a known mode name is rejected
    /// before a request is sent.
    pub async fn get_id_from_pairs<I, K, V>(&self, pairs: I) -> GatewayResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mode = LookupMode::from_pairs(pairs)?;
        self.get_id(&mode).await
    }

    /// Returns the message types `id` can receive.
    pub async fn get_reception_capabilities(
        &self,
        id: &str,
    ) -> GatewayResult<HashSet<ReceptionCapability>> {
        let response = self
            .get_ok(&["capabilities", id], Endpoint::ReceptionCapabilities)
            .await?;
        // The body is fully read here, so a parse failure leaves nothing open.
        let text = response.text().await?;
        parse_capabilities(&text)
    }

    /// Returns the number of credits left on the account.
    pub async fn get_credits(&self) -> GatewayResult<u64> {
        let response = self.get_ok(&["credits"], Endpoint::Credits).await?;
        let text = response.text().await?;
        text.trim()
            .parse()
            .map_err(|e| GatewayError::InvalidResponse(format!("credits {:?}: {}", text, e)))
    }

    /// Sends a message in simple mode; the gateway encrypts it.
    ///
    /// `fields` are posted as they are (e.g. `to`, `text`), plus `from` and
    /// `secret` unless present. Returns the message ID.
    pub async fn send_simple<I, K, V>(&self, fields: I) -> GatewayResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.post_message("send_simple", into_params(fields)).await
    }

    /// Sends an already encrypted message in end-to-end mode.
    ///
    /// `fields` carry the caller-built payload (e.g. `to`, `nonce`, `box`),
    /// plus `from` and `secret` unless present. Returns the message ID.
    pub async fn send_e2e<I, K, V>(&self, fields: I) -> GatewayResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.post_message("send_e2e", into_params(fields)).await
    }

    /// Uploads a blob and returns its ID.
    pub async fn upload(&self, data: impl Into<Vec<u8>>) -> GatewayResult<String> {
        self.post_blob(data.into()).await
    }

    /// Downloads a blob.
    ///
    /// The response is returned unread so large blobs can be streamed; the
    /// caller is responsible for consuming it.
    pub async fn download(&self, blob_id: &str) -> GatewayResult<Response> {
        self.get_ok(&["blobs", blob_id], Endpoint::Blob).await
    }

    /// Downloads a blob into memory.
    pub async fn download_bytes(&self, blob_id: &str) -> GatewayResult<Vec<u8>> {
        let response = self.download(blob_id).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
