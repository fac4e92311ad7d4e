// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pingback wire codec.
//!
//! Encodes and decodes the three message shapes the protocol uses:
//! - `pingback.ping` method calls carrying source and target URIs
//! - success responses carrying a single string
//! - fault responses carrying `faultCode` and `faultString`
//!
//! Decoding is pattern based and tolerant of whitespace and layout, but it
//! only understands these shapes. It is not an XML-RPC parser.

use crate::error::{Fault, FaultCode};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// The only method this codec accepts.
pub const PING_METHOD: &str = "pingback.ping";

/// Success message used when none is supplied.
pub const DEFAULT_SUCCESS: &str = "Pingback Accepted";

static METHOD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<methodName>\s*(.+?)\s*</methodName>").expect("invalid methodName pattern")
});

/// A string `<value>`: either `<string>`-typed or bare text.
static STRING_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<value>\s*(?:<string>(.*?)</string>|([^<\s][^<]*?))\s*</value>")
        .expect("invalid value pattern")
});

static FAULT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<fault>(.+)</fault>").expect("invalid fault pattern")
});

static FAULT_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<name>\s*(\w+)\s*</name>\s*<value>\s*(?:<(?:int|i4|string)>)?(.*?)(?:</(?:int|i4|string)>)?\s*</value>",
    )
    .expect("invalid fault member pattern")
});

/// A decoded `pingback.ping` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRequest {
    pub source_uri: String,
    pub target_uri: String,
}

/// One of the three message shapes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingbackMessage {
    Request { source_uri: String, target_uri: String },
    Success { message: String },
    Fault { code: FaultCode, message: String },
}

/// Encode any message shape.
pub fn encode(message: &PingbackMessage) -> String {
    match message {
        PingbackMessage::Request {
            source_uri,
            target_uri,
        } => encode_request(source_uri, target_uri),
        PingbackMessage::Success { message } => encode_success(message),
        PingbackMessage::Fault { code, message } => encode_fault(*code, Some(message)),
    }
}

/// Encode a fault response. An absent or empty message uses the code's canonical text.
pub fn encode_fault(code: FaultCode, message: Option<&str>) -> String {
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| code.message());
    format!(
        r#"<?xml version="1.0"?>
<methodResponse>
	<fault>
		<value>
		<struct>
			<member>
				<name>faultCode</name>
				<value><int>{}</int></value>
			</member>
			<member>
				<name>faultString</name>
				<value><string>{}</string></value>
			</member>
		</struct>
		</value>
	</fault>
</methodResponse>
"#,
        code.code(),
        escape(message)
    )
}

/// Encode a success response. An empty message becomes [`DEFAULT_SUCCESS`].
pub fn encode_success(message: &str) -> String {
    let message = if message.is_empty() {
        DEFAULT_SUCCESS
    } else {
        message
    };
    format!(
        r#"<?xml version="1.0"?>
<methodResponse>
	<params>
		<param>
			<value><string>{}</string></value>
		</param>
	</params>
</methodResponse>
"#,
        escape(message)
    )
}

/// Encode a `pingback.ping` call with source and target in that order.
pub fn encode_request(source_uri: &str, target_uri: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<methodCall>
	<methodName>{PING_METHOD}</methodName>
	<params>
		<param>
			<value><string>{}</string></value>
		</param>
		<param>
			<value><string>{}</string></value>
		</param>
	</params>
</methodCall>
"#,
        escape(source_uri),
        escape(target_uri)
    )
}

/// Decode an inbound `pingback.ping` call.
pub fn decode_request(body: &[u8]) -> Result<PingRequest, FaultCode> {
    let text = String::from_utf8_lossy(body);

    let method = METHOD_NAME
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let params = string_values(&text);

    let method = match method {
        Some(m) if !params.is_empty() => m,
        _ => {
            debug!(method = ?method, params = params.len(), "Request not well formed");
            return Err(FaultCode::ParseError);
        }
    };

    if method != PING_METHOD {
        debug!(method = %method, "Unknown method requested");
        return Err(FaultCode::WrongMethod);
    }

    let mut params = params.into_iter();
    match (params.next(), params.next()) {
        (Some(source_uri), Some(target_uri)) => Ok(PingRequest {
            source_uri,
            target_uri,
        }),
        _ => {
            debug!("pingback.ping called with fewer than two parameters");
            Err(FaultCode::WrongParams)
        }
    }
}

/// Decode a response to a `pingback.ping` call.
///
/// Returns the success message, or the fault carried by the response. A
/// fault block whose code cannot be read decodes as [`FaultCode::Error`].
pub fn decode_response(body: &[u8]) -> Result<String, Fault> {
    let text = String::from_utf8_lossy(body);

    if let Some(block) = FAULT_BLOCK.captures(&text).and_then(|c| c.get(1)) {
        let members: Vec<String> = FAULT_MEMBER
            .captures_iter(block.as_str())
            .filter_map(|c| c.get(2))
            .map(|m| unescape(m.as_str().trim()).into_owned())
            .take(2)
            .collect();

        let code = members
            .first()
            .and_then(|raw| raw.parse::<i32>().ok())
            .and_then(|raw| {
                let code = FaultCode::from_code(raw);
                if code.is_none() {
                    debug!(fault_code = raw, "Unrecognised fault code");
                }
                code
            })
            .unwrap_or(FaultCode::Error);
        let message = members.get(1).cloned().unwrap_or_default();

        return Err(Fault::new(code, message));
    }

    Ok(string_values(&text).into_iter().next().unwrap_or_default())
}

fn string_values(text: &str) -> Vec<String> {
    STRING_VALUE
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| unescape(m.as_str()).into_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Escape text content for inclusion in an XML element.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

/// Replace the five predefined XML entities.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
