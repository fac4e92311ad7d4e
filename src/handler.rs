// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Inbound pingback handler.
//!
//! One [`PingbackHandler`] owns the state of one inbound notification:
//!
//! ```text
//! Fresh --validate()--> Validated
//!   |                      |
//!   +-- decode / validate / disposition setter --> Terminal
//!                          |
//!               into_xml() consumes the handler (Responded)
//! ```
//!
//! A handler that nobody fails is accepted. Callers that want to reject an
//! otherwise valid notification must set a disposition themselves.

use crate::codec::{self, PingRequest, PingbackMessage, DEFAULT_SUCCESS};
use crate::error::FaultCode;
use crate::excerpt;
use crate::transport::HttpClient;
use std::borrow::Cow;
use std::cell::OnceCell;
use tracing::debug;

/// Observable lifecycle stage of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Decoded, not yet validated, no disposition set.
    Fresh,
    /// `validate()` ran and the source links to the target.
    Validated,
    /// A fault disposition is set.
    Terminal,
}

/// The source page fetched by `validate()` and where the target appears in it.
#[derive(Debug)]
struct SourcePage {
    html: String,
    link_offset: usize,
}

/// Validation state for one inbound pingback.
#[derive(Debug)]
pub struct PingbackHandler {
    request: Option<PingRequest>,
    error: Option<FaultCode>,
    message: Option<String>,
    decode_failed: bool,
    validated: bool,
    page: Option<SourcePage>,
    author: OnceCell<String>,
    excerpt: OnceCell<String>,
}

impl PingbackHandler {
    /// Decode an inbound request body. Decode failures become the handler's error.
    pub fn new(body: &[u8]) -> Self {
        let (request, error) = match codec::decode_request(body) {
            Ok(request) => {
                debug!(
                    source = %request.source_uri,
                    target = %request.target_uri,
                    "Decoded pingback request"
                );
                (Some(request), None)
            }
            Err(code) => (None, Some(code)),
        };

        Self {
            request,
            decode_failed: error.is_some_and(FaultCode::is_transport),
            error,
            message: None,
            validated: false,
            page: None,
            author: OnceCell::new(),
            excerpt: OnceCell::new(),
        }
    }

    /// URI of the page claiming to link to us. `None` if decoding failed.
    pub fn source_uri(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.source_uri.as_str())
    }

    /// URI on our side being linked to. `None` if decoding failed.
    pub fn target_uri(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.target_uri.as_str())
    }

    pub fn error(&self) -> Option<FaultCode> {
        self.error
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn state(&self) -> HandlerState {
        match (self.error, self.validated) {
            (Some(_), _) => HandlerState::Terminal,
            (None, true) => HandlerState::Validated,
            (None, false) => HandlerState::Fresh,
        }
    }

    /// Fetch the source page and check that it links to the target.
    ///
    /// Does nothing when an error is already set. Only the first call
    /// fetches; later calls return the recorded outcome.
    pub fn validate<C: HttpClient + ?Sized>(&mut self, client: &C) -> bool {
        if self.error.is_some() || self.validated {
            return self.is_valid();
        }
        let Some(request) = &self.request else {
            return false;
        };

        let html = match client.fetch_full(&request.source_uri) {
            Ok(html) if !html.is_empty() => html,
            Ok(_) => {
                debug!(source = %request.source_uri, "Source page is empty");
                self.error = Some(FaultCode::SourceMissing);
                return false;
            }
            Err(e) => {
                debug!(source = %request.source_uri, error = %e, "Source page unreachable");
                self.error = Some(FaultCode::SourceMissing);
                return false;
            }
        };

        // Pages write `&` in hrefs as `&amp;`.
        let link_offset = html.find(request.target_uri.as_str()).or_else(|| {
            match codec::escape(&request.target_uri) {
                Cow::Owned(escaped) => html.find(escaped.as_str()),
                Cow::Borrowed(_) => None,
            }
        });

        match link_offset {
            Some(link_offset) => {
                debug!(
                    source = %request.source_uri,
                    target = %request.target_uri,
                    link_offset,
                    "Source links to target"
                );
                self.page = Some(SourcePage { html, link_offset });
                self.validated = true;
                true
            }
            None => {
                debug!(
                    source = %request.source_uri,
                    target = %request.target_uri,
                    "Source does not link to target"
                );
                self.error = Some(FaultCode::SourceBroken);
                false
            }
        }
    }

    /// Reject with an arbitrary code and message.
    pub fn fail(&mut self, code: FaultCode, message: impl Into<String>) {
        let message = message.into();
        if self.set_error(code) {
            self.message = (!message.is_empty()).then_some(message);
        }
    }

    /// The target does not exist here.
    pub fn not_found(&mut self) {
        self.set_error(FaultCode::TargetMissing);
    }

    /// The target exists but cannot receive pingbacks.
    pub fn not_valid(&mut self) {
        self.set_error(FaultCode::TargetInvalid);
    }

    /// The pingback was already registered.
    pub fn not_first(&mut self) {
        self.set_error(FaultCode::Duplicate);
    }

    /// The target refuses pingbacks from this source.
    pub fn not_allowed(&mut self) {
        self.set_error(FaultCode::AccessDenied);
    }

    /// Override the message sent with the response, success or fault.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    // Decode errors win over any later disposition.
    fn set_error(&mut self, code: FaultCode) -> bool {
        if let Some(existing) = self.error.filter(|_| self.decode_failed) {
            debug!(
                existing = existing.code(),
                requested = code.code(),
                "Keeping decode error"
            );
            return false;
        }
        self.error = Some(code);
        true
    }

    /// Title of the source page. Empty unless `validate()` succeeded.
    pub fn author(&self) -> &str {
        match self.usable_page() {
            Some(page) => self
                .author
                .get_or_init(|| excerpt::author(&page.html))
                .as_str(),
            None => "",
        }
    }

    /// Text around the link in the source page. Empty unless `validate()` succeeded.
    pub fn excerpt(&self) -> &str {
        match self.usable_page() {
            Some(page) => self
                .excerpt
                .get_or_init(|| excerpt::excerpt(&page.html, page.link_offset))
                .as_str(),
            None => "",
        }
    }

    fn usable_page(&self) -> Option<&SourcePage> {
        if self.error.is_some() {
            return None;
        }
        self.page.as_ref()
    }

    /// The response this handler would send now.
    pub fn disposition(&self) -> PingbackMessage {
        match self.error {
            None => PingbackMessage::Success {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUCCESS.to_string()),
            },
            Some(code) => PingbackMessage::Fault {
                code,
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| code.message().to_string()),
            },
        }
    }

    /// Encode the response, consuming the handler.
    pub fn into_xml(self) -> String {
        codec::encode(&self.disposition())
    }
}
