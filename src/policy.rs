// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Target acceptance policy for inbound pingbacks.
//!
//! Screens a decoded request before the source is fetched:
//! - Target URL format (absolute http/https with a host)
//! - Target host served by this endpoint
//! - Self-ping blocking (source and target on the same host)

use crate::config::PolicyConfig;
use crate::handler::PingbackHandler;
use tracing::debug;
use url::Url;

/// Why a target was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// Target is not an absolute http/https URL.
    InvalidTarget,
    /// Target host is not served here.
    UnknownHost(String),
    /// Source and target share a host.
    SelfPing(String),
}

/// Target acceptance policy.
pub struct TargetPolicy {
    config: PolicyConfig,
}

impl TargetPolicy {
    /// Create a new policy with the given configuration.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Check a source/target pair.
    pub fn check(&self, source: &str, target: &str) -> Result<(), Refusal> {
        let target_url = match Url::parse(target) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => u,
            _ => {
                debug!(target = %target, "Invalid target URL");
                return Err(Refusal::InvalidTarget);
            }
        };
        let target_host = target_url.host_str().unwrap_or_default().to_lowercase();

        if !self.config.local_hosts.is_empty()
            && !self
                .config
                .local_hosts
                .iter()
                .any(|h| h.eq_ignore_ascii_case(&target_host))
        {
            debug!(target = %target, host = %target_host, "Target host not served here");
            return Err(Refusal::UnknownHost(target_host));
        }

        if self.config.block_self_ping {
            let source_host = Url::parse(source)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase));
            if source_host.as_deref() == Some(target_host.as_str()) {
                debug!(source = %source, target = %target, "Self-ping detected");
                return Err(Refusal::SelfPing(target_host));
            }
        }

        Ok(())
    }

    /// Apply the policy to a handler, setting the matching disposition.
    ///
    /// Handlers that already carry an error are left alone.
    pub fn screen(&self, handler: &mut PingbackHandler) {
        if !handler.is_valid() {
            return;
        }
        let (Some(source), Some(target)) = (handler.source_uri(), handler.target_uri()) else {
            return;
        };
        match self.check(source, target) {
            Ok(()) => {}
            Err(Refusal::InvalidTarget) => handler.not_valid(),
            Err(Refusal::UnknownHost(_)) => handler.not_found(),
            Err(Refusal::SelfPing(_)) => handler.not_allowed(),
        }
    }
}
