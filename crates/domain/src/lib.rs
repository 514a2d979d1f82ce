//! # quotebook-domain
//!
//! Pure domain model for the quotebook quote catalogue.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Quotes** (text attributed to an author, labelled with tags)
//! - Define **Authors** and **Tags**
//! - Define the closed query vocabulary: filters, sort fields, pagination
//! - Build full-text search expressions from user input
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod author;
pub mod query;
pub mod quote;
pub mod search;
pub mod tag;
