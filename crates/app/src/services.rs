//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod author_service;
pub mod delete_quote_service;
pub mod quote_service;
pub mod tag_service;

mod transaction;

#[cfg(test)]
pub(crate) mod testing;
