//! Query-string parsing shared by the quote listings.
//!
//! Numbers are typed so malformed values are rejected by the extractor;
//! sort names go through the domain's `FromStr` so unknown values surface as
//! validation errors.

use std::str::FromStr;

use serde::Deserialize;

use quotebook_domain::error::ValidationError;
use quotebook_domain::query::{
    DEFAULT_LIMIT, ListOptions, QuoteFilters, Sort, SortField, SortOrder, TagFilter,
};

/// Sample size of `GET /api/quotes/random` when no `limit` is given.
pub const DEFAULT_RANDOM_LIMIT: u32 = 1;

/// Query parameters accepted by every quote listing.
///
/// Keys are camelCase (`minLength`, `sortBy`); the snake_case spellings are
/// accepted as aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQueryParams {
    #[serde(alias = "min_length")]
    pub min_length: Option<u32>,
    #[serde(alias = "max_length")]
    pub max_length: Option<u32>,
    /// Exact author name or slug.
    pub author: Option<String>,
    /// `a,b` for all of the tags, `a|b` for any of them.
    pub tags: Option<String>,
    /// Free-text search.
    pub query: Option<String>,
    #[serde(alias = "sort_by")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

impl QuoteQueryParams {
    #[must_use]
    pub fn filters(&self) -> QuoteFilters {
        QuoteFilters {
            min_length: self.min_length,
            max_length: self.max_length,
            author: non_blank(self.author.as_deref()),
            tags: self.tags.as_deref().and_then(TagFilter::parse),
            query: non_blank(self.query.as_deref()),
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] for an unknown sort field or order.
    pub fn sort(&self) -> Result<Sort, ValidationError> {
        let field = self
            .sort_by
            .as_deref()
            .map(SortField::from_str)
            .transpose()?
            .unwrap_or_default();
        let order = self.order.as_deref().map(SortOrder::from_str).transpose()?;
        Ok(Sort::new(field, order))
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] for an invalid sort, page or limit.
    pub fn list_options(&self) -> Result<ListOptions, ValidationError> {
        ListOptions::new(
            self.sort()?,
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }

    #[must_use]
    pub fn random_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_RANDOM_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(uri: &'static str) -> QuoteQueryParams {
        let Query(params) = Query::try_from_uri(&Uri::from_static(uri)).unwrap();
        params
    }

    #[test]
    fn should_read_camel_case_keys() {
        let params = parse("/api/quotes?minLength=5&maxLength=10&sortBy=author&order=desc");
        let filters = params.filters();
        assert_eq!(filters.min_length, Some(5));
        assert_eq!(filters.max_length, Some(10));
        assert_eq!(
            params.sort().unwrap(),
            Sort::new(SortField::Author, Some(SortOrder::Desc))
        );
    }

    #[test]
    fn should_accept_snake_case_aliases() {
        let params = parse("/api/quotes?min_length=3&sort_by=content");
        assert_eq!(params.filters().min_length, Some(3));
        assert_eq!(params.sort().unwrap().field, SortField::Content);
    }

    #[test]
    fn should_reject_unknown_camel_case_sort_field() {
        let params = parse("/api/quotes?sortBy=bogus");
        assert!(params.sort().is_err());
    }

    #[test]
    fn should_drop_blank_text_filters() {
        let params = QuoteQueryParams {
            author: Some("  ".to_string()),
            query: Some(String::new()),
            tags: Some(",".to_string()),
            ..QuoteQueryParams::default()
        };
        assert_eq!(params.filters(), QuoteFilters::default());
    }

    #[test]
    fn should_parse_tag_modes() {
        let params = QuoteQueryParams {
            tags: Some("love|life".to_string()),
            ..QuoteQueryParams::default()
        };
        assert!(matches!(params.filters().tags, Some(TagFilter::Any(_))));
    }

    #[test]
    fn should_default_to_newest_first() {
        let sort = QuoteQueryParams::default().sort().unwrap();
        assert_eq!(sort, Sort::new(SortField::DateAdded, Some(SortOrder::Desc)));
    }

    #[test]
    fn should_reject_unknown_sort_field() {
        let params = QuoteQueryParams {
            sort_by: Some("popularity".to_string()),
            ..QuoteQueryParams::default()
        };
        assert_eq!(
            params.sort(),
            Err(ValidationError::InvalidSortField("popularity".to_string()))
        );
    }

    #[test]
    fn should_reject_limit_above_maximum() {
        let params = QuoteQueryParams {
            limit: Some(151),
            ..QuoteQueryParams::default()
        };
        assert!(matches!(
            params.list_options(),
            Err(ValidationError::InvalidLimit { value: 151, .. })
        ));
    }

    #[test]
    fn should_default_page_and_limit() {
        let options = QuoteQueryParams::default().list_options().unwrap();
        assert_eq!(options.page(), 1);
        assert_eq!(options.limit(), DEFAULT_LIMIT);
        assert_eq!(
            QuoteQueryParams::default().random_limit(),
            DEFAULT_RANDOM_LIMIT
        );
    }
}
