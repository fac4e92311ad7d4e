// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP transport used by discovery, validation and sending.
//!
//! The protocol core only sees the [`HttpClient`] trait. [`ReqwestClient`]
//! is the blocking implementation used by both binaries; it owns timeouts
//! and body bounds.

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, RANGE};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Headers and a bounded body prefix of a fetched resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialPage {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl PartialPage {
    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Blocking HTTP operations the protocol core depends on.
pub trait HttpClient {
    /// Fetch response headers plus a bounded prefix of the body.
    fn fetch_partial(&self, uri: &str) -> Result<PartialPage>;

    /// Fetch the full response body.
    fn fetch_full(&self, uri: &str) -> Result<String>;

    /// POST an XML document and return the response body.
    fn post_xml(&self, uri: &str, body: &str) -> Result<String>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn fetch_partial(&self, uri: &str) -> Result<PartialPage> {
        (**self).fetch_partial(uri)
    }

    fn fetch_full(&self, uri: &str) -> Result<String> {
        (**self).fetch_full(uri)
    }

    fn post_xml(&self, uri: &str, body: &str) -> Result<String> {
        (**self).post_xml(uri, body)
    }
}

/// [`HttpClient`] backed by a blocking `reqwest` client.
///
/// Must not be constructed, used or dropped on an async runtime thread;
/// the endpoint service calls it from `spawn_blocking`.
pub struct ReqwestClient {
    client: Client,
    partial_fetch_bytes: u64,
}

impl ReqwestClient {
    /// Create a new client with the given transport configuration.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            partial_fetch_bytes: config.partial_fetch_bytes,
        })
    }

    fn check_uri(uri: &str) -> Result<()> {
        match url::Url::parse(uri) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
            _ => Err(TransportError::InvalidUri(uri.to_string())),
        }
    }
}

impl HttpClient for ReqwestClient {
    fn fetch_partial(&self, uri: &str) -> Result<PartialPage> {
        Self::check_uri(uri)?;
        let last_byte = self.partial_fetch_bytes.saturating_sub(1);
        let response = self
            .client
            .get(uri)
            .header(RANGE, format!("bytes=0-{}", last_byte))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();

        // Servers are free to ignore Range, so bound the read as well.
        let mut buf = Vec::new();
        response
            .take(self.partial_fetch_bytes)
            .read_to_end(&mut buf)?;

        debug!(uri = %uri, status = status.as_u16(), bytes = buf.len(), "Fetched partial page");
        Ok(PartialPage {
            headers,
            body: String::from_utf8_lossy(&buf).into_owned(),
        })
    }

    fn fetch_full(&self, uri: &str) -> Result<String> {
        Self::check_uri(uri)?;
        let response = self.client.get(uri).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        debug!(uri = %uri, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    fn post_xml(&self, uri: &str, body: &str) -> Result<String> {
        Self::check_uri(uri)?;
        let response = self
            .client
            .post(uri)
            .header(CONTENT_TYPE, "text/xml")
            .body(body.to_string())
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}
