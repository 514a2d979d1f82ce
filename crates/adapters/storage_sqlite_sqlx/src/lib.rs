//! # quotebook-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `quotebook-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle and transactions
//! - Run database migrations (using sqlx embedded migrations)
//! - Translate filters, sorting and pagination into parameterized SQL
//!
//! ## Dependency rule
//! Depends on `quotebook-app` (for port traits) and `quotebook-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod author_repo;
mod error;
mod pool;
mod quote_query;
mod quote_repo;
mod tag_repo;
mod timestamp;

pub use author_repo::SqliteAuthorRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use quote_repo::SqliteQuoteRepository;
pub use tag_repo::SqliteTagRepository;
