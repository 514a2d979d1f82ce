//! Tag service: use-cases for managing tags.

use quotebook_domain::error::{NotFoundError, QuotebookError};
use quotebook_domain::id::TagId;
use quotebook_domain::tag::{NewTag, Tag};

use crate::ports::TagRepository;

/// Application service for tag operations.
pub struct TagService<R> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a tag after validating its name.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if the name is blank or contains
    /// a filter delimiter, or a storage error from the repository.
    #[tracing::instrument(skip(self, tag), fields(tag_name = %tag.name))]
    pub async fn create_tag(&self, tag: NewTag) -> Result<Tag, QuotebookError> {
        tag.validate()?;
        self.repo.create(tag).await
    }

    /// List live tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, QuotebookError> {
        self.repo.get_all().await
    }

    /// Live tags with the given names. Unknown names are skipped.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_by_names(&self, names: &[String]) -> Result<Vec<Tag>, QuotebookError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.get_by_names(names).await
    }

    /// Soft-delete a tag.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::NotFound`] when no live tag has `id`, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_tag(&self, id: TagId) -> Result<Tag, QuotebookError> {
        self.repo.delete(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Tag",
                id: id.to_string(),
            }
            .into()
        })
    }
}
