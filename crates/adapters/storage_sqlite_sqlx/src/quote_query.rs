//! Composable SELECT over live quotes.
//!
//! Every filter appends one parameterized `AND` clause; user input is never
//! spliced into the SQL text. Only the sort column and direction are written
//! literally, and both come from closed enums.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, FromRow, QueryBuilder, Row, Sqlite};

use quotebook_domain::id::{AuthorId, QuoteId};
use quotebook_domain::query::{QuoteFilters, Sort, SortField, TagFilter};
use quotebook_domain::quote::Quote;
use quotebook_domain::search::match_expression;

use crate::error::StorageError;
use crate::timestamp::decode_column;

const SELECT_QUOTES: &str = r"
    SELECT q.id, q.content, q.author_id, a.name AS author_name, a.slug AS author_slug,
           q.created_at, q.updated_at, q.deleted_at,
           (SELECT group_concat(t.name, ',')
              FROM quote_tag qt
              JOIN tags t ON t.id = qt.tag_id
             WHERE qt.quote_id = q.id AND t.deleted_at IS NULL) AS tag_names
    FROM quotes q
    JOIN authors a ON a.id = q.author_id
    WHERE q.deleted_at IS NULL";

const COUNT_QUOTES: &str = r"
    SELECT COUNT(*)
    FROM quotes q
    JOIN authors a ON a.id = q.author_id
    WHERE q.deleted_at IS NULL";

const MATCHING_TAGS: &str = r"
    FROM quote_tag qt
    JOIN tags t ON t.id = qt.tag_id
    WHERE qt.quote_id = q.id AND t.deleted_at IS NULL AND t.name IN (";

/// Wrapper for converting database rows into domain [`Quote`]s.
struct Wrapper(Quote);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let author_id: i64 = row.try_get("author_id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        let deleted_at: Option<String> = row.try_get("deleted_at")?;
        let tag_names: Option<String> = row.try_get("tag_names")?;

        // group_concat has no defined order
        let mut tags: Vec<String> = tag_names
            .as_deref()
            .map(|names| names.split(',').map(ToOwned::to_owned).collect())
            .unwrap_or_default();
        tags.sort();

        Ok(Self(Quote {
            id: QuoteId::new(id),
            content: row.try_get("content")?,
            author_id: AuthorId::new(author_id),
            author: row.try_get("author_name")?,
            author_slug: row.try_get("author_slug")?,
            tags,
            created_at: decode_column(&created_at)?,
            updated_at: decode_column(&updated_at)?,
            deleted_at: deleted_at.as_deref().map(decode_column).transpose()?,
        }))
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::DateAdded => "q.created_at",
        SortField::DateModified => "q.updated_at",
        SortField::Content => "q.content",
        SortField::Author => "a.name",
    }
}

/// Builder for queries over live quotes joined with their author.
pub(crate) struct QuoteQuery {
    builder: QueryBuilder<'static, Sqlite>,
}

impl QuoteQuery {
    /// Select full quote rows.
    pub(crate) fn select() -> Self {
        Self {
            builder: QueryBuilder::new(SELECT_QUOTES),
        }
    }

    /// Count matching quotes.
    pub(crate) fn count() -> Self {
        Self {
            builder: QueryBuilder::new(COUNT_QUOTES),
        }
    }

    /// Apply every set dimension of `filters`.
    pub(crate) fn filters(&mut self, filters: &QuoteFilters) -> &mut Self {
        self.min_length(filters.min_length)
            .max_length(filters.max_length)
            .author(filters.author.as_deref())
            .tags(filters.tags.as_ref())
            .search(filters.query.as_deref())
    }

    pub(crate) fn min_length(&mut self, min: Option<u32>) -> &mut Self {
        if let Some(min) = min {
            self.builder
                .push(" AND length(q.content) >= ")
                .push_bind(i64::from(min));
        }
        self
    }

    pub(crate) fn max_length(&mut self, max: Option<u32>) -> &mut Self {
        if let Some(max) = max {
            self.builder
                .push(" AND length(q.content) <= ")
                .push_bind(i64::from(max));
        }
        self
    }

    /// Exact match on the author's name or slug.
    pub(crate) fn author(&mut self, author: Option<&str>) -> &mut Self {
        if let Some(author) = author {
            self.builder
                .push(" AND (a.name = ")
                .push_bind(author.to_owned())
                .push(" OR a.slug = ")
                .push_bind(author.to_owned())
                .push(")");
        }
        self
    }

    /// `All` requires every distinct listed name among the quote's live
    /// tags; `Any` requires at least one.
    pub(crate) fn tags(&mut self, filter: Option<&TagFilter>) -> &mut Self {
        let Some(filter) = filter else {
            return self;
        };
        let mut names: Vec<String> = filter.names().to_vec();
        names.sort();
        names.dedup();

        match filter {
            TagFilter::All(_) => {
                let required = i64::try_from(names.len()).unwrap_or(i64::MAX);
                self.builder.push(" AND (SELECT COUNT(DISTINCT t.name) ");
                self.push_name_list(names);
                self.builder.push(") = ").push_bind(required);
            }
            TagFilter::Any(_) => {
                self.builder.push(" AND EXISTS (SELECT 1 ");
                self.push_name_list(names);
                self.builder.push(")");
            }
        }
        self
    }

    fn push_name_list(&mut self, names: Vec<String>) {
        self.builder.push(MATCHING_TAGS);
        let mut list = self.builder.separated(", ");
        for name in names {
            list.push_bind(name);
        }
        list.push_unseparated(")");
    }

    /// Full-text prefix search. Text without any usable term adds no
    /// constraint.
    pub(crate) fn search(&mut self, text: Option<&str>) -> &mut Self {
        if let Some(expression) = text.and_then(match_expression) {
            self.builder
                .push(" AND q.id IN (SELECT rowid FROM quotes_fts WHERE quotes_fts MATCH ")
                .push_bind(expression)
                .push(")");
        }
        self
    }

    pub(crate) fn ids(&mut self, ids: &[QuoteId]) -> &mut Self {
        self.builder.push(" AND q.id IN (");
        let mut list = self.builder.separated(", ");
        for id in ids {
            list.push_bind(id.as_i64());
        }
        list.push_unseparated(")");
        self
    }

    pub(crate) fn contents(&mut self, contents: &[String]) -> &mut Self {
        self.builder.push(" AND q.content IN (");
        let mut list = self.builder.separated(", ");
        for content in contents {
            list.push_bind(content.clone());
        }
        list.push_unseparated(")");
        self
    }

    /// Order by the sort field, ties broken by id in the same direction.
    pub(crate) fn order_by(&mut self, sort: Sort) -> &mut Self {
        let direction = sort.order.as_sql();
        self.builder.push(format!(
            " ORDER BY {} {direction}, q.id {direction}",
            sort_column(sort.field)
        ));
        self
    }

    pub(crate) fn order_by_id(&mut self) -> &mut Self {
        self.builder.push(" ORDER BY q.id ASC");
        self
    }

    pub(crate) fn order_randomly(&mut self) -> &mut Self {
        self.builder.push(" ORDER BY RANDOM()");
        self
    }

    pub(crate) fn limit(&mut self, limit: u32) -> &mut Self {
        self.builder.push(" LIMIT ").push_bind(i64::from(limit));
        self
    }

    pub(crate) fn offset(&mut self, offset: u64) -> &mut Self {
        self.builder
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
        self
    }

    pub(crate) async fn fetch_all<'c, E>(&mut self, executor: E) -> Result<Vec<Quote>, StorageError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let rows: Vec<Wrapper> = self.builder.build_query_as().fetch_all(executor).await?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    pub(crate) async fn fetch_optional<'c, E>(
        &mut self,
        executor: E,
    ) -> Result<Option<Quote>, StorageError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let row: Option<Wrapper> = self
            .builder
            .build_query_as()
            .fetch_optional(executor)
            .await?;
        Ok(row.map(|w| w.0))
    }

    pub(crate) async fn fetch_count<'c, E>(&mut self, executor: E) -> Result<u64, StorageError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let count: i64 = self
            .builder
            .build_query_scalar()
            .fetch_one(executor)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
