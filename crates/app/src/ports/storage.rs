//! Storage ports: repository traits for persistence.
//!
//! Writes that may need to join a larger unit of work take an explicit
//! `Option<&mut Self::Tx>`: `None` runs the statement on its own, `Some`
//! routes it through the caller's open transaction. Nothing is attached to
//! ambient state, so a service can only get atomicity by passing the handle.

use std::future::Future;

use quotebook_domain::author::{Author, NewAuthor};
use quotebook_domain::error::QuotebookError;
use quotebook_domain::id::{AuthorId, QuoteId, TagId};
use quotebook_domain::query::{ListOptions, Page, QuoteFilters, Sort};
use quotebook_domain::quote::{NewQuote, Quote, QuoteChanges};
use quotebook_domain::tag::{NewTag, Tag};

/// A store able to open, commit and roll back transactions.
pub trait Transactional {
    /// Handle to an open transaction. Dropping it without committing
    /// discards its writes.
    type Tx: Send;

    /// Open a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, QuotebookError>> + Send;

    /// Make every write performed through `tx` durable.
    fn commit(&self, tx: Self::Tx) -> impl Future<Output = Result<(), QuotebookError>> + Send;

    /// Discard every write performed through `tx`.
    fn rollback(&self, tx: Self::Tx) -> impl Future<Output = Result<(), QuotebookError>> + Send;
}

/// Repository for reading and writing [`Quote`]s.
///
/// Reads only ever return live (not soft-deleted) quotes.
pub trait QuoteRepository: Transactional {
    /// One page of quotes matching `filters`, ordered by `options.sort`.
    fn index(
        &self,
        filters: &QuoteFilters,
        options: ListOptions,
    ) -> impl Future<Output = Result<Page<Quote>, QuotebookError>> + Send;

    /// A single quote picked at random among those matching `filters`.
    fn random(
        &self,
        filters: &QuoteFilters,
    ) -> impl Future<Output = Result<Option<Quote>, QuotebookError>> + Send;

    /// Up to `limit` quotes sampled at random among those matching
    /// `filters`, then ordered by `sort`.
    fn random_many(
        &self,
        filters: &QuoteFilters,
        limit: u32,
        sort: Sort,
    ) -> impl Future<Output = Result<Vec<Quote>, QuotebookError>> + Send;

    fn get_by_id(
        &self,
        id: QuoteId,
    ) -> impl Future<Output = Result<Option<Quote>, QuotebookError>> + Send;

    fn get_by_ids(
        &self,
        ids: &[QuoteId],
    ) -> impl Future<Output = Result<Vec<Quote>, QuotebookError>> + Send;

    /// Quotes whose content exactly equals one of `contents`.
    fn get_by_contents(
        &self,
        contents: &[String],
    ) -> impl Future<Output = Result<Vec<Quote>, QuotebookError>> + Send;

    /// The ids among `ids` that belong to an existing author.
    fn known_authors(
        &self,
        ids: &[AuthorId],
    ) -> impl Future<Output = Result<Vec<AuthorId>, QuotebookError>> + Send;

    /// The ids among `ids` that belong to a live tag.
    fn live_tags(
        &self,
        ids: &[TagId],
    ) -> impl Future<Output = Result<Vec<TagId>, QuotebookError>> + Send;

    fn create(
        &self,
        quote: NewQuote,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<Quote, QuotebookError>> + Send;

    /// Insert every quote with a single batch statement.
    fn create_many(
        &self,
        quotes: Vec<NewQuote>,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<Vec<Quote>, QuotebookError>> + Send;

    /// Apply `changes` to the quote. `None` when no live quote has `id`.
    fn update(
        &self,
        id: QuoteId,
        changes: QuoteChanges,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<Option<Quote>, QuotebookError>> + Send;

    /// Soft-delete the quote and return it. `None` when no live quote has `id`.
    fn delete(
        &self,
        id: QuoteId,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<Option<Quote>, QuotebookError>> + Send;

    /// Link tags to the quote, ignoring links that already exist.
    /// Returns the number of new links.
    fn attach_tags(
        &self,
        id: QuoteId,
        tag_ids: &[TagId],
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<u64, QuotebookError>> + Send;

    /// Remove every tag link of the quote. Returns the number removed.
    fn detach_tags(
        &self,
        id: QuoteId,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = Result<u64, QuotebookError>> + Send;
}

/// Repository for [`Author`]s.
pub trait AuthorRepository {
    fn create(
        &self,
        author: NewAuthor,
    ) -> impl Future<Output = Result<Author, QuotebookError>> + Send;

    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Author>, QuotebookError>> + Send;

    /// All authors ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Author>, QuotebookError>> + Send;
}

/// Repository for [`Tag`]s.
pub trait TagRepository {
    fn create(&self, tag: NewTag) -> impl Future<Output = Result<Tag, QuotebookError>> + Send;

    /// All live tags ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Tag>, QuotebookError>> + Send;

    /// Live tags whose name is one of `names`.
    fn get_by_names(
        &self,
        names: &[String],
    ) -> impl Future<Output = Result<Vec<Tag>, QuotebookError>> + Send;

    /// Soft-delete the tag. `None` when no live tag has `id`.
    fn delete(&self, id: TagId)
    -> impl Future<Output = Result<Option<Tag>, QuotebookError>> + Send;
}
