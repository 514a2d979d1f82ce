//! Quote: a piece of text attributed to an author and labelled with tags.

use serde::{Deserialize, Serialize};

use crate::error::{QuotebookError, ValidationError};
use crate::id::{AuthorId, QuoteId};
use crate::time::Timestamp;

/// A stored quote, as read back from persistence.
///
/// Carries the author's display fields and the names of its live tags so
/// callers do not need a second round-trip to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub content: String,
    pub author_id: AuthorId,
    pub author: String,
    pub author_slug: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Quote {
    /// Length of the content in characters, the unit used by length filters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.content.chars().count()
    }

    /// Whether the quote has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for inserting a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub content: String,
    pub author_id: AuthorId,
}

impl NewQuote {
    /// Create a builder for constructing a [`NewQuote`].
    #[must_use]
    pub fn builder() -> NewQuoteBuilder {
        NewQuoteBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] when `content` is blank.
    pub fn validate(&self) -> Result<(), QuotebookError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`NewQuote`].
#[derive(Debug, Default)]
pub struct NewQuoteBuilder {
    content: Option<String>,
    author_id: Option<AuthorId>,
}

impl NewQuoteBuilder {
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn author_id(mut self, author_id: AuthorId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Consume the builder, validate, and return a [`NewQuote`].
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] if the author is missing or the
    /// content is blank.
    pub fn build(self) -> Result<NewQuote, QuotebookError> {
        let author_id = self.author_id.ok_or(ValidationError::MissingAuthor)?;
        let quote = NewQuote {
            content: self.content.unwrap_or_default(),
            author_id,
        };
        quote.validate()?;
        Ok(quote)
    }
}

/// Partial update applied to an existing quote. Only `content` is mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteChanges {
    pub content: Option<String>,
}

impl QuoteChanges {
    /// Check that a provided content overwrite is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] when `content` is `Some` but blank.
    pub fn validate(&self) -> Result<(), QuotebookError> {
        match &self.content {
            Some(content) if content.trim().is_empty() => {
                Err(ValidationError::EmptyContent.into())
            }
            _ => Ok(()),
        }
    }

    /// Apply the changes to `quote`, returning whether anything changed.
    pub fn apply_to(&self, quote: &mut Quote) -> bool {
        match &self.content {
            Some(content) if *content != quote.content => {
                quote.content.clone_from(content);
                true
            }
            _ => false,
        }
    }
}
