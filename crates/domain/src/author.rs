//! Author: the person a quote is attributed to.

use serde::{Deserialize, Serialize};

use crate::error::{QuotebookError, ValidationError};
use crate::id::AuthorId;
use crate::time::Timestamp;

/// A stored author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    pub slug: String,
}

impl NewAuthor {
    /// Create an author whose slug is derived from `name`.
    #[must_use]
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] when the name is blank or the
    /// slug is not lowercase alphanumerics separated by single dashes.
    pub fn validate(&self) -> Result<(), QuotebookError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !is_valid_slug(&self.slug) {
            return Err(ValidationError::InvalidSlug(self.slug.clone()).into());
        }
        Ok(())
    }
}

/// Turn a display name into a URL-safe slug (`"Ada Lovelace"` → `"ada-lovelace"`).
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn is_valid_slug(slug: &str) -> bool {
    let valid_char = |c: char| c.is_alphanumeric() && !c.is_uppercase();
    !slug.is_empty()
        && slug
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(valid_char))
}
