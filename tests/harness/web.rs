// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! In-memory web for exercising discovery, validation and sending.

use pingback::error::{Result, TransportError};
use pingback::{HttpClient, PartialPage, PingbackHandler};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Bytes served by `fetch_partial`, matching the default transport config.
const PARTIAL_BYTES: usize = 4096;

#[derive(Debug, Clone, Default)]
struct Page {
    headers: Vec<(String, String)>,
    body: String,
}

/// A fake web of pages and pingback endpoints.
#[derive(Debug, Default)]
pub struct FakeWeb {
    pages: HashMap<String, Page>,
    endpoints: HashSet<String>,
    full_fetches: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, String)>>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `uri`.
    pub fn page(mut self, uri: &str, html: impl Into<String>) -> Self {
        self.pages.entry(uri.to_string()).or_default().body = html.into();
        self
    }

    /// Add a response header to the page at `uri`.
    pub fn header(mut self, uri: &str, name: &str, value: &str) -> Self {
        self.pages
            .entry(uri.to_string())
            .or_default()
            .headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Answer POSTs to `uri` with a pingback handler validating against this web.
    pub fn endpoint(mut self, uri: &str) -> Self {
        self.endpoints.insert(uri.to_string());
        self
    }

    /// URIs fetched in full, in order.
    pub fn full_fetches(&self) -> Vec<String> {
        self.full_fetches.lock().unwrap().clone()
    }

    /// (endpoint, body) of every POST, in order.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }

    fn not_found(uri: &str) -> TransportError {
        TransportError::Status {
            uri: uri.to_string(),
            status: 404,
        }
    }
}

impl HttpClient for FakeWeb {
    fn fetch_partial(&self, uri: &str) -> Result<PartialPage> {
        let page = self.pages.get(uri).ok_or_else(|| Self::not_found(uri))?;
        let mut end = page.body.len().min(PARTIAL_BYTES);
        while !page.body.is_char_boundary(end) {
            end -= 1;
        }
        Ok(PartialPage {
            headers: page.headers.clone(),
            body: page.body[..end].to_string(),
        })
    }

    fn fetch_full(&self, uri: &str) -> Result<String> {
        self.full_fetches.lock().unwrap().push(uri.to_string());
        self.pages
            .get(uri)
            .map(|p| p.body.clone())
            .ok_or_else(|| Self::not_found(uri))
    }

    fn post_xml(&self, uri: &str, body: &str) -> Result<String> {
        self.posts
            .lock()
            .unwrap()
            .push((uri.to_string(), body.to_string()));
        if !self.endpoints.contains(uri) {
            return Err(Self::not_found(uri));
        }
        let mut handler = PingbackHandler::new(body.as_bytes());
        handler.validate(self);
        Ok(handler.into_xml())
    }
}
