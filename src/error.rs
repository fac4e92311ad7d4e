// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pingback fault codes and error types.

use std::fmt;
use thiserror::Error;

/// Pingback fault codes, including the XML-RPC transport family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    Error,
    SourceMissing,
    SourceBroken,
    TargetMissing,
    TargetInvalid,
    Duplicate,
    AccessDenied,
    UpstreamError,
    ParseError,
    WrongMethod,
    WrongParams,
}

impl FaultCode {
    /// Every fault code, in wire-value order.
    pub const ALL: [FaultCode; 11] = [
        FaultCode::ParseError,
        FaultCode::WrongMethod,
        FaultCode::WrongParams,
        FaultCode::Error,
        FaultCode::SourceMissing,
        FaultCode::SourceBroken,
        FaultCode::TargetMissing,
        FaultCode::TargetInvalid,
        FaultCode::Duplicate,
        FaultCode::AccessDenied,
        FaultCode::UpstreamError,
    ];

    /// Numeric `faultCode` sent on the wire.
    pub fn code(self) -> i32 {
        match self {
            FaultCode::Error => 0x0000,
            FaultCode::SourceMissing => 0x0010,
            FaultCode::SourceBroken => 0x0011,
            FaultCode::TargetMissing => 0x0020,
            FaultCode::TargetInvalid => 0x0021,
            FaultCode::Duplicate => 0x0030,
            FaultCode::AccessDenied => 0x0031,
            FaultCode::UpstreamError => 0x0032,
            FaultCode::ParseError => -32700,
            FaultCode::WrongMethod => -32601,
            FaultCode::WrongParams => -32500,
        }
    }

    /// Canonical `faultString` used when no message override is given.
    pub fn message(self) -> &'static str {
        match self {
            FaultCode::Error => "Error.",
            FaultCode::SourceMissing => "The source URI does not exist.",
            FaultCode::SourceBroken => "The source URI does not contain a link to the target URI.",
            FaultCode::TargetMissing => "The specified target URI does not exist.",
            FaultCode::TargetInvalid => "The specified target URI cannot be used as a target.",
            FaultCode::Duplicate => "The pingback has already been registered.",
            FaultCode::AccessDenied => "Access denied.",
            FaultCode::UpstreamError => "Upstream error.",
            FaultCode::ParseError => "parse error. not well formed",
            FaultCode::WrongMethod => "server error. requested method not found",
            FaultCode::WrongParams => "server error. invalid method parameters",
        }
    }

    /// Look up a fault code by its wire value.
    pub fn from_code(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|fault| fault.code() == value)
    }

    /// Faults raised while decoding the request rather than by validation.
    pub fn is_transport(self) -> bool {
        matches!(
            self,
            FaultCode::ParseError | FaultCode::WrongMethod | FaultCode::WrongParams
        )
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// A fault disposition with its code and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pingback fault {}: {message}", .code.code())]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
}

impl Fault {
    /// Build a fault, falling back to the canonical message when `message` is empty.
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            code.message().to_string()
        } else {
            message
        };
        Self { code, message }
    }
}

impl From<FaultCode> for Fault {
    fn from(code: FaultCode) -> Self {
        Self::new(code, String::new())
    }
}

/// Errors raised by an [`HttpClient`](crate::transport::HttpClient) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {uri}")]
    Status { uri: String, status: u16 },

    #[error("I/O error reading response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for fault in FaultCode::ALL {
            assert_eq!(FaultCode::from_code(fault.code()), Some(fault));
            assert!(!fault.message().is_empty());
        }
        let distinct: std::collections::HashSet<i32> =
            FaultCode::ALL.iter().map(|f| f.code()).collect();
        assert_eq!(distinct.len(), FaultCode::ALL.len());
        assert_eq!(FaultCode::from_code(12345), None);
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(FaultCode::Error.code(), 0);
        assert_eq!(FaultCode::SourceMissing.code(), 16);
        assert_eq!(FaultCode::SourceBroken.code(), 17);
        assert_eq!(FaultCode::TargetMissing.code(), 32);
        assert_eq!(FaultCode::Duplicate.code(), 48);
        assert_eq!(FaultCode::UpstreamError.code(), 50);
        assert_eq!(FaultCode::ParseError.code(), -32700);
    }

    #[test]
    fn test_fault_defaults_message() {
        let fault = Fault::new(FaultCode::AccessDenied, "");
        assert_eq!(fault.message, "Access denied.");

        let fault = Fault::new(FaultCode::AccessDenied, "Not today");
        assert_eq!(fault.message, "Not today");
        assert_eq!(fault.to_string(), "pingback fault 49: Not today");
    }

    #[test]
    fn test_transport_family() {
        assert!(FaultCode::ParseError.is_transport());
        assert!(FaultCode::WrongParams.is_transport());
        assert!(!FaultCode::TargetMissing.is_transport());
    }
}
