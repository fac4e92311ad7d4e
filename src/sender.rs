// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound pingbacks.

use crate::codec;
use crate::discovery;
use crate::error::{Fault, FaultCode};
use crate::links;
use crate::transport::HttpClient;
use tracing::{debug, info, warn};

/// Outcome of pinging one target.
pub type PingResult = Result<String, Fault>;

/// Sends pingbacks through an [`HttpClient`].
pub struct PingSender<C> {
    client: C,
}

impl<C: HttpClient> PingSender<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Notify `target_uri` that `source_uri` links to it.
    ///
    /// Returns the endpoint's success message, or the fault it replied with.
    /// Missing endpoints and empty or failed POSTs are generic errors.
    pub fn ping(&self, source_uri: &str, target_uri: &str) -> PingResult {
        let Some(endpoint) = discovery::discover(&self.client, target_uri) else {
            debug!(target = %target_uri, "Target is not pingable");
            return Err(FaultCode::Error.into());
        };

        let request = codec::encode_request(source_uri, target_uri);
        let response = match self.client.post_xml(&endpoint, &request) {
            Ok(body) if !body.trim().is_empty() => body,
            Ok(_) => {
                warn!(endpoint = %endpoint, "Empty response from pingback endpoint");
                return Err(FaultCode::Error.into());
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Pingback POST failed");
                return Err(FaultCode::Error.into());
            }
        };

        let result = codec::decode_response(response.as_bytes());
        match &result {
            Ok(message) => info!(target = %target_uri, message = %message, "Pingback accepted"),
            Err(fault) => info!(
                target = %target_uri,
                code = fault.code.code(),
                message = %fault.message,
                "Pingback rejected"
            ),
        }
        result
    }

    /// Ping every distinct link found in `html`, published at `source_uri`.
    pub fn ping_all(&self, source_uri: &str, html: &str) -> Vec<(String, PingResult)> {
        links::extract_links(html)
            .into_iter()
            .filter(|target| target != source_uri)
            .map(|target| {
                let result = self.ping(source_uri, &target);
                (target, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TransportError};
    use crate::transport::PartialPage;
    use std::cell::RefCell;

    /// Every target advertises the same endpoint; records POSTs.
    struct Endpoint {
        reply: String,
        posts: RefCell<Vec<String>>,
    }

    impl HttpClient for Endpoint {
        fn fetch_partial(&self, uri: &str) -> Result<PartialPage> {
            if uri.contains("unpingable") {
                return Ok(PartialPage::default());
            }
            Ok(PartialPage {
                headers: vec![("X-Pingback".to_string(), "http://e/rpc".to_string())],
                body: String::new(),
            })
        }

        fn fetch_full(&self, uri: &str) -> Result<String> {
            Err(TransportError::InvalidUri(uri.to_string()))
        }

        fn post_xml(&self, _uri: &str, body: &str) -> Result<String> {
            self.posts.borrow_mut().push(body.to_string());
            Ok(self.reply.clone())
        }
    }

    fn sender(reply: impl Into<String>) -> PingSender<Endpoint> {
        PingSender::new(Endpoint {
            reply: reply.into(),
            posts: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn test_ping_success() {
        let s = sender(codec::encode_success("Thanks"));
        assert_eq!(s.ping("http://s/", "http://t/"), Ok("Thanks".to_string()));

        let posts = s.client().posts.borrow();
        let sent = codec::decode_request(posts[0].as_bytes()).unwrap();
        assert_eq!(sent.source_uri, "http://s/");
        assert_eq!(sent.target_uri, "http://t/");
    }

    #[test]
    fn test_ping_propagates_fault() {
        let fault = sender(codec::encode_fault(FaultCode::SourceBroken, None))
            .ping("http://s/", "http://t/")
            .unwrap_err();
        assert_eq!(fault.code, FaultCode::SourceBroken);
    }

    #[test]
    fn test_no_endpoint_never_posts() {
        let s = sender("unused");
        let fault = s.ping("http://s/", "http://unpingable/").unwrap_err();
        assert_eq!(fault.code, FaultCode::Error);
        assert!(s.client().posts.borrow().is_empty());
    }

    #[test]
    fn test_empty_response_is_error() {
        let fault = sender("  ").ping("http://s/", "http://t/").unwrap_err();
        assert_eq!(fault, Fault::from(FaultCode::Error));
    }

    #[test]
    fn test_ping_all_skips_self_links() {
        let s = sender("<methodResponse><params><param><value>ok</value></param></params></methodResponse>");
        let html = r#"<a href="http://s/">me</a><a href="http://a/">a</a><a href="http://unpingable/">u</a>"#;
        let results = s.ping_all("http://s/", html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ("http://a/".to_string(), Ok("ok".to_string())));
        assert!(results[1].1.is_err());
    }
}
