//! Shared application state for axum handlers.

use std::sync::Arc;

use quotebook_app::ports::{AuthorRepository, QuoteRepository, TagRepository};
use quotebook_app::services::author_service::AuthorService;
use quotebook_app::services::delete_quote_service::DeleteQuoteService;
use quotebook_app::services::quote_service::QuoteService;
use quotebook_app::services::tag_service::TagService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`. Only the `Arc` wrappers are cloned.
pub struct AppState<QR, AR, TR> {
    /// Quote queries and writes.
    pub quote_service: Arc<QuoteService<QR>>,
    /// Transactional quote deletion.
    pub delete_quote_service: Arc<DeleteQuoteService<QR>>,
    pub author_service: Arc<AuthorService<AR>>,
    pub tag_service: Arc<TagService<TR>>,
}

impl<QR, AR, TR> Clone for AppState<QR, AR, TR> {
    fn clone(&self) -> Self {
        Self {
            quote_service: Arc::clone(&self.quote_service),
            delete_quote_service: Arc::clone(&self.delete_quote_service),
            author_service: Arc::clone(&self.author_service),
            tag_service: Arc::clone(&self.tag_service),
        }
    }
}

impl<QR, AR, TR> AppState<QR, AR, TR>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        quote_service: QuoteService<QR>,
        delete_quote_service: DeleteQuoteService<QR>,
        author_service: AuthorService<AR>,
        tag_service: TagService<TR>,
    ) -> Self {
        Self {
            quote_service: Arc::new(quote_service),
            delete_quote_service: Arc::new(delete_quote_service),
            author_service: Arc::new(author_service),
            tag_service: Arc::new(tag_service),
        }
    }
}
