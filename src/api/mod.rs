// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API for the damage-assessment node.
//!
//! Two independent endpoints, one per detection strategy, plus a health
//! probe. Each request is a single synchronous unit of work; no queueing or
//! retries.

pub mod detect_and_recommend;
pub mod errors;
pub mod http_server;
pub mod image_analysis;
pub mod upload;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{build_router, start_server, AppState};
