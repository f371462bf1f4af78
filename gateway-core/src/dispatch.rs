// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request Dispatch
//!
//! Every request carries the API identity (`from`) and secret (`secret`).
//! For GET queries and POST forms they are defaults: a value the caller
//! already supplied for either key is kept. Blob uploads always send fresh
//! credentials in the query string.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use tracing::debug;

use crate::connection::Connection;
use crate::error::{classify, Endpoint, GatewayError, GatewayResult};

/// Query parameters or form fields of a request.
pub type Params = BTreeMap<String, String>;

/// Multipart field name of an uploaded blob.
pub const BLOB_FIELD: &str = "blob";

/// Collects `(key, value)` pairs into [`Params`].
pub fn into_params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl Connection {
    /// Builds the URL for `segments` below the base URL, percent-encoding each.
    pub(crate) fn endpoint_url(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url().clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Adds `from` and `secret` unless the caller set them.
    pub(crate) fn with_credentials(&self, mut params: Params) -> Params {
        params
            .entry("from".to_string())
            .or_insert_with(|| self.id().to_string());
        params
            .entry("secret".to_string())
            .or_insert_with(|| self.secret().to_string());
        params
    }

    /// Sends a GET to `segments` with credentials added to `params`.
    ///
    /// Returns the response whatever its status.
    pub async fn get(&self, segments: &[&str], params: Params) -> GatewayResult<Response> {
        let session = self.session()?;
        let url = self.endpoint_url(segments)?;
        let params = self.with_credentials(params);

        debug!(endpoint = segments.first().copied().unwrap_or(""), "GET");
        Ok(session.get(url).query(&params).send().await?)
    }

    /// GET that maps any status other than 200 to an `endpoint` error.
    pub(crate) async fn get_ok(
        &self,
        segments: &[&str],
        endpoint: Endpoint,
    ) -> GatewayResult<Response> {
        let response = self.get(segments, Params::new()).await?;
        if response.status() == StatusCode::OK {
            Ok(response)
        } else {
            Err(classify(response, endpoint).await)
        }
    }

    /// Posts form `fields` to a message endpoint and returns the message ID.
    pub(crate) async fn post_message(&self, path: &str, fields: Params) -> GatewayResult<String> {
        let session = self.session()?;
        let url = self.endpoint_url(&[path])?;
        let fields = self.with_credentials(fields);

        debug!(endpoint = path, fields = fields.len(), "POST");
        let response = session.post(url).form(&fields).send().await?;
        if response.status() == StatusCode::OK {
            Ok(response.text().await?)
        } else {
            Err(classify(response, Endpoint::Message).await)
        }
    }

    /// Uploads `data` as a multipart blob and returns the blob ID.
    pub(crate) async fn post_blob(&self, data: Vec<u8>) -> GatewayResult<String> {
        let session = self.session()?;
        let url = self.endpoint_url(&["upload_blob"])?;
        let params = [("from", self.id()), ("secret", self.secret())];

        debug!(endpoint = "upload_blob", size = data.len(), "POST");
        let part = Part::bytes(data)
            .file_name(BLOB_FIELD)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(BLOB_FIELD, part);

        let response = session.post(url).query(&params).multipart(form).send().await?;
        if response.status() == StatusCode::OK {
            Ok(response.text().await?)
        } else {
            Err(classify(response, Endpoint::Blob).await)
        }
    }
}
