// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the Pingback endpoint service.
//!
//! The protocol core is blocking, so each notification is screened and
//! validated on a blocking worker. Decoding and the duplicate checks run on
//! the async side, so repeats are refused without fetching the source.

use crate::codec;
use crate::config::Config;
use crate::error::FaultCode;
use crate::handler::PingbackHandler;
use crate::policy::TargetPolicy;
use crate::registry::{PingRegistry, RegisterOutcome, Registration};
use crate::transport::HttpClient;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Content types accepted on the endpoint.
const XML_CONTENT_TYPES: &[&str] = &["text/xml", "application/xml"];

/// Shared application state.
pub struct AppState {
    pub client: Arc<dyn HttpClient + Send + Sync>,
    pub policy: TargetPolicy,
    pub registry: PingRegistry,
    pub config: Config,
}

impl AppState {
    /// Build state from configuration and a transport.
    pub fn new(config: Config, client: Arc<dyn HttpClient + Send + Sync>) -> Self {
        Self {
            client,
            policy: TargetPolicy::new(config.policy.clone()),
            registry: PingRegistry::new(&config.registry),
            config,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body = state.config.max_request_bytes;
    Router::new()
        .route(&state.config.endpoint_path, post(pingback))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pingback-endpoint",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Receive a `pingback.ping` call and reply with the encoded disposition.
pub async fn pingback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if !is_xml(content_type) {
        debug!(content_type = ?content_type, "Rejecting non-XML request");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse {
                error: format!("expected one of {:?}", XML_CONTENT_TYPES),
                code: "INVALID_CONTENT_TYPE",
            }),
        )
            .into_response();
    }

    let mut handler = PingbackHandler::new(&body);
    if let (Some(source), Some(target)) = (handler.source_uri(), handler.target_uri()) {
        if state.registry.is_registered(source, target).await {
            debug!(source = %source, target = %target, "Already registered, skipping fetch");
            handler.not_first();
        }
    }

    if handler.is_valid() {
        let worker_state = state.clone();
        let worker = tokio::task::spawn_blocking(move || screen_and_validate(&worker_state, handler));
        handler = match worker.await {
            Ok(handler) => handler,
            Err(e) => {
                warn!(error = %e, "Pingback worker failed");
                return xml_response(codec::encode_fault(FaultCode::UpstreamError, None));
            }
        };
    }

    let handler = register(&state.registry, handler).await;
    xml_response(handler.into_xml())
}

/// Decode, screen and validate one notification. Blocks on the source fetch.
pub fn process(state: &AppState, body: &[u8]) -> PingbackHandler {
    screen_and_validate(state, PingbackHandler::new(body))
}

fn screen_and_validate(state: &AppState, mut handler: PingbackHandler) -> PingbackHandler {
    state.policy.screen(&mut handler);
    handler.validate(state.client.as_ref());
    handler
}

/// Record a valid pingback, marking repeats as duplicates.
async fn register(registry: &PingRegistry, mut handler: PingbackHandler) -> PingbackHandler {
    if !handler.is_valid() {
        info!(
            source = ?handler.source_uri(),
            target = ?handler.target_uri(),
            code = handler.error().map(|c| c.code()),
            "Pingback refused"
        );
        return handler;
    }
    let (Some(source), Some(target)) = (handler.source_uri(), handler.target_uri()) else {
        return handler;
    };

    let registration = Registration {
        source_uri: source.to_string(),
        target_uri: target.to_string(),
        author: handler.author().to_string(),
        excerpt: handler.excerpt().to_string(),
        received_at: Utc::now(),
    };

    match registry.register(registration.clone()).await {
        RegisterOutcome::Registered => {
            info!(
                source = %registration.source_uri,
                target = %registration.target_uri,
                author = %registration.author,
                excerpt = %registration.excerpt,
                "Pingback accepted"
            );
        }
        RegisterOutcome::Duplicate => handler.not_first(),
    }
    handler
}

fn is_xml(content_type: Option<&str>) -> bool {
    content_type
        .map(|s| s.split(';').next().unwrap_or(s).trim().to_lowercase())
        .is_some_and(|ct| XML_CONTENT_TYPES.contains(&ct.as_str()))
}

fn xml_response(xml: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], xml).into_response()
}
