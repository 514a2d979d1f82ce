//! Query parameters for listing quotes: filters, sorting and pagination.
//!
//! These are the closed, validated forms of what callers pass as strings.
//! Parsing happens at the boundary (`FromStr`/serde); repositories only ever
//! see these types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quote::Quote;

/// Page size used when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size accepted by paginated listings.
pub const MAX_LIMIT: u32 = 150;
/// Largest sample size accepted by random listings.
pub const MAX_RANDOM_LIMIT: u32 = 50;

/// Tag constraint parsed from a delimited string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// `"a,b"`: the quote must carry every listed tag.
    All(Vec<String>),
    /// `"a|b"`: the quote must carry at least one listed tag.
    Any(Vec<String>),
}

impl TagFilter {
    /// Parse a tag expression. A `|` anywhere switches to OR mode; otherwise
    /// `,` separates required tags. Blank segments are dropped, and an
    /// expression with no remaining segments yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (separator, any) = if raw.contains('|') {
            ('|', true)
        } else {
            (',', false)
        };
        let names: Vec<String> = raw
            .split(separator)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if names.is_empty() {
            None
        } else if any {
            Some(Self::Any(names))
        } else {
            Some(Self::All(names))
        }
    }

    /// The tag names referenced by this filter.
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::All(names) | Self::Any(names) => names,
        }
    }
}

/// Filters shared by every quote listing. All set dimensions are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilters {
    /// Minimum content length in characters, inclusive.
    pub min_length: Option<u32>,
    /// Maximum content length in characters, inclusive.
    pub max_length: Option<u32>,
    /// Exact author name or slug.
    pub author: Option<String>,
    pub tags: Option<TagFilter>,
    /// Free text, matched as prefix terms against the content index.
    pub query: Option<String>,
}

/// Field a quote listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DateAdded,
    DateModified,
    Content,
    Author,
}

impl SortField {
    pub const ALL: [Self; 4] = [
        Self::DateAdded,
        Self::DateModified,
        Self::Content,
        Self::Author,
    ];

    /// External name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateAdded => "dateAdded",
            Self::DateModified => "dateModified",
            Self::Content => "content",
            Self::Author => "author",
        }
    }

    /// Direction used when the caller gives none: alphabetical fields sort
    /// ascending, dates newest-first.
    #[must_use]
    pub fn default_order(self) -> SortOrder {
        match self {
            Self::Content | Self::Author => SortOrder::Asc,
            Self::DateAdded | Self::DateModified => SortOrder::Desc,
        }
    }

    fn compare(self, a: &Quote, b: &Quote) -> Ordering {
        match self {
            Self::DateAdded => a.created_at.cmp(&b.created_at),
            Self::DateModified => a.updated_at.cmp(&b.updated_at),
            Self::Content => a.content.cmp(&b.content),
            Self::Author => a.author.cmp(&b.author),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidSortField(s.to_owned()))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ValidationError::InvalidSortOrder(s.to_owned())),
        }
    }
}

/// A sort field together with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    /// Build a sort, falling back to the field's default direction.
    #[must_use]
    pub fn new(field: SortField, order: Option<SortOrder>) -> Self {
        Self {
            field,
            order: order.unwrap_or_else(|| field.default_order()),
        }
    }

    /// Total order over quotes: by field, ties broken by id, then reversed
    /// for descending sorts.
    #[must_use]
    pub fn compare(&self, a: &Quote, b: &Quote) -> Ordering {
        let ordering = self.field.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Sort a slice of quotes in place.
    pub fn apply(&self, quotes: &mut [Quote]) {
        quotes.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::new(SortField::default(), None)
    }
}

/// Sorting and pagination for [`Page`] listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: Sort,
    page: u32,
    limit: u32,
}

impl ListOptions {
    /// Validate and build list options.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPage`] when `page` is 0 and
    /// [`ValidationError::InvalidLimit`] when `limit` is outside `1..=MAX_LIMIT`.
    pub fn new(sort: Sort, page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ValidationError::InvalidLimit {
                value: limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { sort, page, limit })
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sort: Sort::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    /// Number of matching rows across all pages.
    pub total_count: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.limit.max(1)))
    }

    /// Whether a page after this one exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

/// Validate the sample size of a random listing.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidLimit`] when `limit` is outside
/// `1..=MAX_RANDOM_LIMIT`.
pub fn check_random_limit(limit: u32) -> Result<u32, ValidationError> {
    if limit == 0 || limit > MAX_RANDOM_LIMIT {
        return Err(ValidationError::InvalidLimit {
            value: limit,
            max: MAX_RANDOM_LIMIT,
        });
    }
    Ok(limit)
}
