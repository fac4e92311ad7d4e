// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory registry of accepted pingbacks.
//!
//! Remembers each accepted (source, target) pair for the retention window
//! so repeated notifications can be answered with the duplicate fault.
//! Nothing is persisted; storing pingbacks durably is up to the embedder.

use crate::config::RegistryConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// An accepted pingback.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub source_uri: String,
    pub target_uri: String,
    pub author: String,
    pub excerpt: String,
    pub received_at: DateTime<Utc>,
}

/// Result of registering a pingback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// First time this pair was seen within the retention window
    Registered,
    /// Pair already registered
    Duplicate,
}

#[derive(Debug)]
struct Entry {
    registration: Registration,
    seen: Instant,
}

/// Thread-safe registry keyed by (source, target).
pub struct PingRegistry {
    retention: Duration,
    entries: Arc<RwLock<HashMap<(String, String), Entry>>>,
}

impl PingRegistry {
    /// Create a new registry with the given configuration.
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            retention: config.retention(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record an accepted pingback unless it is a duplicate.
    pub async fn register(&self, registration: Registration) -> RegisterOutcome {
        let key = (
            registration.source_uri.clone(),
            registration.target_uri.clone(),
        );
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&key) {
            if now.duration_since(existing.seen) < self.retention {
                debug!(
                    source = %key.0,
                    target = %key.1,
                    first_seen = %existing.registration.received_at,
                    "Duplicate pingback"
                );
                return RegisterOutcome::Duplicate;
            }
        }

        entries.insert(
            key,
            Entry {
                registration,
                seen: now,
            },
        );
        RegisterOutcome::Registered
    }

    /// Look up a registration.
    pub async fn get(&self, source_uri: &str, target_uri: &str) -> Option<Registration> {
        let entries = self.entries.read().await;
        entries
            .get(&(source_uri.to_string(), target_uri.to_string()))
            .map(|e| e.registration.clone())
    }

    /// Whether the pair was accepted within the retention window.
    pub async fn is_registered(&self, source_uri: &str, target_uri: &str) -> bool {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(&(source_uri.to_string(), target_uri.to_string()))
            .is_some_and(|e| now.duration_since(e.seen) < self.retention)
    }

    /// Number of registrations currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop registrations older than the retention window (should be called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.seen) < self.retention);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Registry cleanup");
        }
    }
}
