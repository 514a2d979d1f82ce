//! Quote service: use-cases for reading and writing quotes.

use quotebook_domain::error::{NotFoundError, QuotebookError};
use std::collections::BTreeSet;

use quotebook_domain::id::{AuthorId, QuoteId, TagId};
use quotebook_domain::query::{ListOptions, Page, QuoteFilters, Sort, check_random_limit};
use quotebook_domain::quote::{NewQuote, Quote, QuoteChanges};

use crate::ports::QuoteRepository;
use crate::services::transaction::settle;

/// A quote to import together with the tags it should carry.
#[derive(Debug, Clone)]
pub struct ImportItem {
    pub quote: NewQuote,
    pub tag_ids: Vec<TagId>,
}

/// Application service for quote queries and writes.
pub struct QuoteService<R> {
    repo: R,
}

impl<R: QuoteRepository> QuoteService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// One page of quotes matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_quotes(
        &self,
        filters: &QuoteFilters,
        options: ListOptions,
    ) -> Result<Page<Quote>, QuotebookError> {
        self.repo.index(filters, options).await
    }

    /// A single random quote matching `filters`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn random_quote(
        &self,
        filters: &QuoteFilters,
    ) -> Result<Option<Quote>, QuotebookError> {
        self.repo.random(filters).await
    }

    /// Up to `limit` random quotes matching `filters`, presented in `sort`
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if `limit` is out of range, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn random_quotes(
        &self,
        filters: &QuoteFilters,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let limit = check_random_limit(limit)?;
        self.repo.random_many(filters, limit, sort).await
    }

    /// Look up a quote by id, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_quote(&self, id: QuoteId) -> Result<Option<Quote>, QuotebookError> {
        self.repo.get_by_id(id).await
    }

    /// Look up a quote by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::NotFound`] when no quote with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_quote(&self, id: QuoteId) -> Result<Quote, QuotebookError> {
        self.find_quote(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Quote",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// The quotes among `ids` that exist. Missing ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn get_quotes(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, QuotebookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.get_by_ids(ids).await
    }

    /// Quotes whose content exactly matches one of `contents`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_by_contents(
        &self,
        contents: &[String],
    ) -> Result<Vec<Quote>, QuotebookError> {
        if contents.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.get_by_contents(contents).await
    }

    /// Create a quote after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if invariants fail,
    /// [`QuotebookError::NotFound`] if the author does not exist, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, quote), fields(author_id = %quote.author_id))]
    pub async fn create_quote(&self, quote: NewQuote) -> Result<Quote, QuotebookError> {
        quote.validate()?;
        self.check_authors([quote.author_id]).await?;
        self.repo.create(quote, None).await
    }

    /// Create many quotes with a single batch insert.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if any quote is invalid or
    /// [`QuotebookError::NotFound`] if an author does not exist (nothing is
    /// written in either case), or a storage error from the repository.
    #[tracing::instrument(skip(self, quotes), fields(count = quotes.len()))]
    pub async fn create_quotes(&self, quotes: Vec<NewQuote>) -> Result<Vec<Quote>, QuotebookError> {
        if quotes.is_empty() {
            return Ok(Vec::new());
        }
        for quote in &quotes {
            quote.validate()?;
        }
        self.check_authors(quotes.iter().map(|quote| quote.author_id))
            .await?;
        self.repo.create_many(quotes, None).await
    }

    /// Create quotes and link their tags in one transaction.
    ///
    /// Either every quote is created with all of its tags, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if any quote is invalid,
    /// [`QuotebookError::NotFound`] if an author or tag does not exist, or the
    /// first storage error encountered (after rolling back).
    #[tracing::instrument(skip(self, items), fields(count = items.len()))]
    pub async fn import_quotes(
        &self,
        items: Vec<ImportItem>,
    ) -> Result<Vec<Quote>, QuotebookError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        for item in &items {
            item.quote.validate()?;
        }
        self.check_authors(items.iter().map(|item| item.quote.author_id))
            .await?;
        self.check_tags(items.iter().flat_map(|item| item.tag_ids.clone()))
            .await?;

        let mut tx = self.repo.begin().await?;
        let result = self.import_within(&mut tx, items).await;
        settle(&self.repo, tx, result).await
    }

    async fn import_within(
        &self,
        tx: &mut R::Tx,
        items: Vec<ImportItem>,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let (quotes, tag_ids): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.quote, item.tag_ids))
            .unzip();

        let created = self.repo.create_many(quotes, Some(&mut *tx)).await?;
        for (quote, tag_ids) in created.iter().zip(&tag_ids) {
            if tag_ids.is_empty() {
                continue;
            }
            self.repo
                .attach_tags(quote.id, tag_ids, Some(&mut *tx))
                .await?;
        }

        let ids: Vec<QuoteId> = created.iter().map(|quote| quote.id).collect();
        tracing::debug!(?ids, "imported quotes");
        Ok(created)
    }

    /// Overwrite the content of a quote.
    ///
    /// Returns `Ok(None)` when no live quote has `id`; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if the new content is blank, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_quote(
        &self,
        id: QuoteId,
        changes: QuoteChanges,
    ) -> Result<Option<Quote>, QuotebookError> {
        changes.validate()?;
        self.repo.update(id, changes, None).await
    }

    /// Link existing tags to a quote. Returns the number of new links.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::NotFound`] when the quote or one of the
    /// tags does not exist, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn attach_tags(&self, id: QuoteId, tag_ids: &[TagId]) -> Result<u64, QuotebookError> {
        self.get_quote(id).await?;
        if tag_ids.is_empty() {
            return Ok(0);
        }
        self.check_tags(tag_ids.iter().copied()).await?;
        self.repo.attach_tags(id, tag_ids, None).await
    }

    /// Fail with `NotFound` on the first author id that has no row.
    async fn check_authors(
        &self,
        ids: impl IntoIterator<Item = AuthorId>,
    ) -> Result<(), QuotebookError> {
        let wanted: Vec<AuthorId> = distinct(ids);
        let known = self.repo.known_authors(&wanted).await?;
        first_missing("Author", &wanted, &known)
    }

    /// Fail with `NotFound` on the first tag id that is unknown or deleted.
    async fn check_tags(
        &self,
        ids: impl IntoIterator<Item = TagId>,
    ) -> Result<(), QuotebookError> {
        let wanted: Vec<TagId> = distinct(ids);
        if wanted.is_empty() {
            return Ok(());
        }
        let live = self.repo.live_tags(&wanted).await?;
        first_missing("Tag", &wanted, &live)
    }
}

fn distinct<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

fn first_missing<T>(
    entity: &'static str,
    wanted: &[T],
    found: &[T],
) -> Result<(), QuotebookError>
where
    T: PartialEq + std::fmt::Display,
{
    match wanted.iter().find(|id| !found.contains(id)) {
        Some(id) => Err(NotFoundError {
            entity,
            id: id.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
