//! Author service: use-cases for managing authors.

use quotebook_domain::author::{Author, NewAuthor};
use quotebook_domain::error::{NotFoundError, QuotebookError};

use crate::ports::AuthorRepository;

/// Application service for author operations.
pub struct AuthorService<R> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new author after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, author), fields(slug = %author.slug))]
    pub async fn create_author(&self, author: NewAuthor) -> Result<Author, QuotebookError> {
        author.validate()?;
        self.repo.create(author).await
    }

    /// Look up an author by slug, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::NotFound`] when no author has `slug`,
    /// or a storage error from the repository.
    pub async fn get_author_by_slug(&self, slug: &str) -> Result<Author, QuotebookError> {
        self.repo.get_by_slug(slug).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Author",
                id: slug.to_string(),
            }
            .into()
        })
    }

    /// List all authors.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_authors(&self) -> Result<Vec<Author>, QuotebookError> {
        self.repo.get_all().await
    }
}
