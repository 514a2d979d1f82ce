//! Delete quote service: removes a quote and its tag links atomically.

use quotebook_domain::error::QuotebookError;
use quotebook_domain::id::QuoteId;
use quotebook_domain::quote::Quote;

use crate::ports::QuoteRepository;
use crate::services::transaction::settle;

/// Deletes quotes so that no tag link outlives its quote.
///
/// The delete and the detach run in one transaction whose handle is passed
/// explicitly to both repository calls: either both take effect or neither
/// does.
pub struct DeleteQuoteService<R> {
    repo: R,
}

impl<R: QuoteRepository> DeleteQuoteService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Delete the quote and detach all of its tags.
    ///
    /// Returns the deleted quote, or `Ok(None)` when no live quote has `id`
    /// (the detach step still runs and the transaction is committed).
    ///
    /// # Errors
    ///
    /// Returns the first error raised by either step, unchanged, after the
    /// transaction has been rolled back. Errors opening or committing the
    /// transaction are returned as-is.
    #[tracing::instrument(skip(self))]
    pub async fn delete_quote(&self, id: QuoteId) -> Result<Option<Quote>, QuotebookError> {
        let mut tx = self.repo.begin().await?;
        let result = self.delete_within(&mut tx, id).await;
        settle(&self.repo, tx, result).await
    }

    async fn delete_within(
        &self,
        tx: &mut R::Tx,
        id: QuoteId,
    ) -> Result<Option<Quote>, QuotebookError> {
        let deleted = self.repo.delete(id, Some(&mut *tx)).await?;
        let detached = self.repo.detach_tags(id, Some(&mut *tx)).await?;
        tracing::debug!(%id, detached, found = deleted.is_some(), "deleted quote");
        Ok(deleted)
    }
}
