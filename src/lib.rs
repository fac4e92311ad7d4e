// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pingback
//!
//! This crate implements both sides of the Pingback protocol for
//! indieweb2-bastion:
//!
//! - Receiving: decode a `pingback.ping` call, check that the source page
//!   really links to the target, and reply with success or a fault
//! - Sending: discover a target's endpoint (`X-Pingback` header or
//!   `<link rel="pingback">`) and notify it
//! - Author and excerpt extraction for accepted pingbacks
//! - Target acceptance policy and in-memory duplicate suppression for the
//!   hosted endpoint
//!
//! The protocol core is synchronous. All network access goes through the
//! [`HttpClient`] trait.

pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod excerpt;
pub mod handler;
pub mod handlers;
pub mod links;
pub mod policy;
pub mod registry;
pub mod sender;
pub mod transport;

pub use codec::{PingRequest, PingbackMessage};
pub use config::Config;
pub use error::{Fault, FaultCode, TransportError};
pub use handler::{HandlerState, PingbackHandler};
pub use sender::PingSender;
pub use transport::{HttpClient, PartialPage, ReqwestClient};
