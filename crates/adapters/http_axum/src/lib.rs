//! # quotebook-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API for quotes, authors and tags under `/api`
//! - Parse and validate query strings, paths and bodies into domain types
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `quotebook-app` (for port traits and services) and
//! `quotebook-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
