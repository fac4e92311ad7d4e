// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for Pingback integration tests.
//!
//! [`web::FakeWeb`] stands in for the network: it serves canned pages and
//! answers POSTs to registered endpoints with a real handler.

pub mod generators;
pub mod web;
