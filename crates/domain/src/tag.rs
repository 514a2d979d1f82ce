//! Tag: a label attached to quotes through a many-to-many relation.

use serde::{Deserialize, Serialize};

use crate::error::{QuotebookError, ValidationError};
use crate::id::TagId;
use crate::time::Timestamp;

/// Characters reserved by the tag filter syntax.
pub const RESERVED_CHARS: [char; 2] = [',', '|'];

/// A stored tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Input for inserting a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
}

impl NewTag {
    /// The name is stored trimmed.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim().to_owned(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotebookError::Validation`] when the name is blank or
    /// contains one of [`RESERVED_CHARS`].
    pub fn validate(&self) -> Result<(), QuotebookError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.name.contains(RESERVED_CHARS) {
            return Err(ValidationError::InvalidTagName(self.name.clone()).into());
        }
        Ok(())
    }
}
