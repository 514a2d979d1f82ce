//! # quotebook-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `QuoteRepository`: filtered reads, random sampling, writes, tag links
//!   - `AuthorRepository`: create and look up authors
//!   - `TagRepository`: create, list and soft-delete tags
//!   - `Transactional`: explicit transaction handles for multi-step writes
//! - Define **driving/inbound ports** as use-case structs:
//!   - `QuoteService`: list, sample, look up, create, import, update
//!   - `DeleteQuoteService`: delete a quote and detach its tags atomically
//!   - `AuthorService`, `TagService`
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `quotebook-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
