// SPDX-License-Identifier: AGPL-3.0-or-later

//! Efficiency Tracker - Developer Productivity Metrics Service
//!
//! This crate provides an HTTP API for recording and reporting the time
//! engineering teams save by using AI coding assistants. Entries are stored
//! as JSON documents, locally or in S3, and aggregated into team and
//! organization dashboards.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance and role-based extractors
//! - `config` - Environment-driven runtime configuration
//! - `storage` - Object store backends and typed repositories
//! - `stats` - Aggregation over recorded entries

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
