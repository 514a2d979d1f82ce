//! `SQLite` implementation of [`QuoteRepository`].
//!
//! Reads always go through the pool. Writes run on the caller's transaction
//! when one is given and on a freshly acquired connection otherwise; every
//! statement a write needs, including the read-back of the rows it touched,
//! runs on that same connection.

use sqlx::pool::PoolConnection;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};

use quotebook_app::ports::{QuoteRepository, Transactional};
use quotebook_domain::error::QuotebookError;
use quotebook_domain::id::{AuthorId, QuoteId, TagId};
use quotebook_domain::query::{ListOptions, Page, QuoteFilters, Sort};
use quotebook_domain::quote::{NewQuote, Quote, QuoteChanges};
use quotebook_domain::time::now;

use crate::error::StorageError;
use crate::quote_query::QuoteQuery;
use crate::timestamp;

const INSERT: &str = r"
    INSERT INTO quotes (content, author_id, created_at, updated_at)
    VALUES (?, ?, ?, ?)
    RETURNING id
";
const INSERT_MANY: &str = "INSERT INTO quotes (content, author_id, created_at, updated_at) ";
const UPDATE_CONTENT: &str = "UPDATE quotes SET content = ?, updated_at = ? WHERE id = ?";
const SOFT_DELETE: &str = "UPDATE quotes SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL";
const ATTACH_TAGS: &str = "INSERT OR IGNORE INTO quote_tag (quote_id, tag_id) ";
const DETACH_TAGS: &str = "DELETE FROM quote_tag WHERE quote_id = ?";
const KNOWN_AUTHORS: &str = "SELECT id FROM authors WHERE id IN (";
const LIVE_TAGS: &str = "SELECT id FROM tags WHERE deleted_at IS NULL AND id IN (";

/// `SQLite`-backed quote repository.
#[derive(Clone)]
pub struct SqliteQuoteRepository {
    pool: SqlitePool,
}

impl SqliteQuoteRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, StorageError> {
        Ok(self.pool.acquire().await?)
    }
}

/// The ids among `ids` returned by `select`, a query ending in `IN (`.
async fn existing_ids(
    pool: &SqlitePool,
    select: &'static str,
    ids: impl IntoIterator<Item = i64>,
) -> Result<Vec<i64>, StorageError> {
    let mut builder = QueryBuilder::<Sqlite>::new(select);
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(id);
    }
    list.push_unseparated(")");
    Ok(builder.build_query_scalar().fetch_all(pool).await?)
}

async fn find_live(
    conn: &mut SqliteConnection,
    id: QuoteId,
) -> Result<Option<Quote>, StorageError> {
    QuoteQuery::select().ids(&[id]).fetch_optional(conn).await
}

async fn insert_one(conn: &mut SqliteConnection, quote: NewQuote) -> Result<Quote, StorageError> {
    let ts = timestamp::encode(now());
    let id: i64 = sqlx::query_scalar(INSERT)
        .bind(quote.content)
        .bind(quote.author_id.as_i64())
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&mut *conn)
        .await?;

    find_live(conn, QuoteId::new(id))
        .await?
        .ok_or(StorageError::Database(sqlx::Error::RowNotFound))
}

async fn insert_many(
    conn: &mut SqliteConnection,
    quotes: Vec<NewQuote>,
) -> Result<Vec<Quote>, StorageError> {
    if quotes.is_empty() {
        return Ok(Vec::new());
    }

    let ts = timestamp::encode(now());
    let mut builder = QueryBuilder::<Sqlite>::new(INSERT_MANY);
    builder.push_values(quotes, |mut row, quote| {
        row.push_bind(quote.content)
            .push_bind(quote.author_id.as_i64())
            .push_bind(ts.clone())
            .push_bind(ts.clone());
    });
    builder.push(" RETURNING id");

    let ids: Vec<i64> = builder
        .build_query_scalar()
        .fetch_all(&mut *conn)
        .await?;
    let ids: Vec<QuoteId> = ids.into_iter().map(QuoteId::new).collect();

    QuoteQuery::select()
        .ids(&ids)
        .order_by_id()
        .fetch_all(conn)
        .await
}

async fn update_content(
    conn: &mut SqliteConnection,
    id: QuoteId,
    changes: QuoteChanges,
) -> Result<Option<Quote>, StorageError> {
    let Some(mut quote) = find_live(&mut *conn, id).await? else {
        return Ok(None);
    };
    if changes.apply_to(&mut quote) {
        quote.updated_at = now();
        sqlx::query(UPDATE_CONTENT)
            .bind(&quote.content)
            .bind(timestamp::encode(quote.updated_at))
            .bind(id.as_i64())
            .execute(&mut *conn)
            .await?;
    }
    Ok(Some(quote))
}

async fn soft_delete(
    conn: &mut SqliteConnection,
    id: QuoteId,
) -> Result<Option<Quote>, StorageError> {
    let Some(mut quote) = find_live(&mut *conn, id).await? else {
        return Ok(None);
    };
    let deleted_at = now();
    sqlx::query(SOFT_DELETE)
        .bind(timestamp::encode(deleted_at))
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;
    quote.deleted_at = Some(deleted_at);
    Ok(Some(quote))
}

async fn insert_links(
    conn: &mut SqliteConnection,
    id: QuoteId,
    tag_ids: &[TagId],
) -> Result<u64, StorageError> {
    if tag_ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::<Sqlite>::new(ATTACH_TAGS);
    builder.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(id.as_i64()).push_bind(tag_id.as_i64());
    });
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

async fn delete_links(conn: &mut SqliteConnection, id: QuoteId) -> Result<u64, StorageError> {
    let result = sqlx::query(DETACH_TAGS)
        .bind(id.as_i64())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

impl Transactional for SqliteQuoteRepository {
    type Tx = Transaction<'static, Sqlite>;

    async fn begin(&self) -> Result<Self::Tx, QuotebookError> {
        Ok(self.pool.begin().await.map_err(StorageError::from)?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), QuotebookError> {
        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), QuotebookError> {
        tx.rollback().await.map_err(StorageError::from)?;
        Ok(())
    }
}

impl QuoteRepository for SqliteQuoteRepository {
    async fn index(
        &self,
        filters: &QuoteFilters,
        options: ListOptions,
    ) -> Result<Page<Quote>, QuotebookError> {
        let total_count = QuoteQuery::count()
            .filters(filters)
            .fetch_count(&self.pool)
            .await?;
        let items = QuoteQuery::select()
            .filters(filters)
            .order_by(options.sort)
            .limit(options.limit())
            .offset(options.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            page: options.page(),
            limit: options.limit(),
            total_count,
        })
    }

    async fn random(&self, filters: &QuoteFilters) -> Result<Option<Quote>, QuotebookError> {
        let quote = QuoteQuery::select()
            .filters(filters)
            .order_randomly()
            .limit(1)
            .fetch_optional(&self.pool)
            .await?;
        Ok(quote)
    }

    async fn random_many(
        &self,
        filters: &QuoteFilters,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let mut quotes = QuoteQuery::select()
            .filters(filters)
            .order_randomly()
            .limit(limit)
            .fetch_all(&self.pool)
            .await?;
        sort.apply(&mut quotes);
        Ok(quotes)
    }

    async fn get_by_id(&self, id: QuoteId) -> Result<Option<Quote>, QuotebookError> {
        let quote = QuoteQuery::select()
            .ids(&[id])
            .fetch_optional(&self.pool)
            .await?;
        Ok(quote)
    }

    async fn get_by_ids(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, QuotebookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let quotes = QuoteQuery::select()
            .ids(ids)
            .order_by_id()
            .fetch_all(&self.pool)
            .await?;
        Ok(quotes)
    }

    async fn get_by_contents(&self, contents: &[String]) -> Result<Vec<Quote>, QuotebookError> {
        if contents.is_empty() {
            return Ok(Vec::new());
        }
        let quotes = QuoteQuery::select()
            .contents(contents)
            .order_by_id()
            .fetch_all(&self.pool)
            .await?;
        Ok(quotes)
    }

    async fn known_authors(&self, ids: &[AuthorId]) -> Result<Vec<AuthorId>, QuotebookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = existing_ids(&self.pool, KNOWN_AUTHORS, ids.iter().map(|id| id.as_i64()))
            .await?;
        Ok(found.into_iter().map(AuthorId::new).collect())
    }

    async fn live_tags(&self, ids: &[TagId]) -> Result<Vec<TagId>, QuotebookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = existing_ids(&self.pool, LIVE_TAGS, ids.iter().map(|id| id.as_i64()))
            .await?;
        Ok(found.into_iter().map(TagId::new).collect())
    }

    async fn create(
        &self,
        quote: NewQuote,
        tx: Option<&mut Self::Tx>,
    ) -> Result<Quote, QuotebookError> {
        let created = match tx {
            Some(tx) => insert_one(tx, quote).await,
            None => insert_one(&mut *self.acquire().await?, quote).await,
        }?;
        tracing::debug!(id = %created.id, "created quote");
        Ok(created)
    }

    async fn create_many(
        &self,
        quotes: Vec<NewQuote>,
        tx: Option<&mut Self::Tx>,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let created = match tx {
            Some(tx) => insert_many(tx, quotes).await,
            None => insert_many(&mut *self.acquire().await?, quotes).await,
        }?;
        tracing::debug!(count = created.len(), "created quotes");
        Ok(created)
    }

    async fn update(
        &self,
        id: QuoteId,
        changes: QuoteChanges,
        tx: Option<&mut Self::Tx>,
    ) -> Result<Option<Quote>, QuotebookError> {
        let updated = match tx {
            Some(tx) => update_content(tx, id, changes).await,
            None => update_content(&mut *self.acquire().await?, id, changes).await,
        }?;
        tracing::debug!(%id, found = updated.is_some(), "updated quote");
        Ok(updated)
    }

    async fn delete(
        &self,
        id: QuoteId,
        tx: Option<&mut Self::Tx>,
    ) -> Result<Option<Quote>, QuotebookError> {
        let deleted = match tx {
            Some(tx) => soft_delete(tx, id).await,
            None => soft_delete(&mut *self.acquire().await?, id).await,
        }?;
        tracing::debug!(%id, found = deleted.is_some(), "soft-deleted quote");
        Ok(deleted)
    }

    async fn attach_tags(
        &self,
        id: QuoteId,
        tag_ids: &[TagId],
        tx: Option<&mut Self::Tx>,
    ) -> Result<u64, QuotebookError> {
        let attached = match tx {
            Some(tx) => insert_links(tx, id, tag_ids).await,
            None => insert_links(&mut *self.acquire().await?, id, tag_ids).await,
        }?;
        Ok(attached)
    }

    async fn detach_tags(
        &self,
        id: QuoteId,
        tx: Option<&mut Self::Tx>,
    ) -> Result<u64, QuotebookError> {
        let detached = match tx {
            Some(tx) => delete_links(tx, id).await,
            None => delete_links(&mut *self.acquire().await?, id).await,
        }?;
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_repo::SqliteAuthorRepository;
    use crate::pool::Config;
    use crate::tag_repo::SqliteTagRepository;
    use quotebook_app::ports::{AuthorRepository, TagRepository};
    use quotebook_app::services::delete_quote_service::DeleteQuoteService;
    use quotebook_domain::author::NewAuthor;
    use quotebook_domain::query::{SortField, SortOrder, TagFilter};
    use quotebook_domain::tag::NewTag;

    struct Fixture {
        pool: SqlitePool,
        quotes: SqliteQuoteRepository,
        tags: SqliteTagRepository,
        seneca: AuthorId,
        twain: AuthorId,
    }

    impl Fixture {
        async fn quote(&self, content: &str, author_id: AuthorId, tags: &[&str]) -> Quote {
            let quote = self
                .quotes
                .create(
                    NewQuote::builder()
                        .content(content)
                        .author_id(author_id)
                        .build()
                        .unwrap(),
                    None,
                )
                .await
                .unwrap();
            let mut tag_ids = Vec::new();
            for name in tags {
                let existing = self.tags.get_by_names(&[(*name).to_string()]).await.unwrap();
                let id = match existing.first() {
                    Some(tag) => tag.id,
                    None => self.tags.create(NewTag::new(*name)).await.unwrap().id,
                };
                tag_ids.push(id);
            }
            self.quotes
                .attach_tags(quote.id, &tag_ids, None)
                .await
                .unwrap();
            quote
        }
    }

    async fn setup() -> Fixture {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let pool = db.pool().clone();
        let authors = SqliteAuthorRepository::new(pool.clone());
        let seneca = authors
            .create(NewAuthor::from_name("Seneca"))
            .await
            .unwrap()
            .id;
        let twain = authors
            .create(NewAuthor::from_name("Mark Twain"))
            .await
            .unwrap()
            .id;

        Fixture {
            quotes: SqliteQuoteRepository::new(pool.clone()),
            tags: SqliteTagRepository::new(pool.clone()),
            pool,
            seneca,
            twain,
        }
    }

    fn contents(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.content.as_str()).collect()
    }

    #[tokio::test]
    async fn should_report_only_existing_authors_and_live_tags() {
        let fx = setup().await;
        let kept = fx.tags.create(NewTag::new("kept")).await.unwrap();
        let dropped = fx.tags.create(NewTag::new("dropped")).await.unwrap();
        fx.tags.delete(dropped.id).await.unwrap();

        let authors = fx
            .quotes
            .known_authors(&[fx.seneca, AuthorId::new(404)])
            .await
            .unwrap();
        assert_eq!(authors, [fx.seneca]);

        let tags = fx
            .quotes
            .live_tags(&[kept.id, dropped.id, TagId::new(404)])
            .await
            .unwrap();
        assert_eq!(tags, [kept.id]);
    }

    #[tokio::test]
    async fn should_create_and_retrieve_quote_with_author_and_tags() {
        let fx = setup().await;
        let created = fx.quote("Luck is what happens", fx.seneca, &["luck", "life"]).await;

        let fetched = fx.quotes.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Luck is what happens");
        assert_eq!(fetched.author, "Seneca");
        assert_eq!(fetched.author_slug, "seneca");
        assert_eq!(fetched.tags, ["life", "luck"]);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn should_return_none_when_quote_not_found() {
        let fx = setup().await;
        assert!(fx.quotes.get_by_id(QuoteId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_filter_by_exact_author_name_or_slug() {
        let fx = setup().await;
        fx.quote("Difficulties strengthen the mind", fx.seneca, &[]).await;
        fx.quote("The secret of getting ahead", fx.twain, &[]).await;

        for author in ["Mark Twain", "mark-twain"] {
            let filters = QuoteFilters {
                author: Some(author.to_string()),
                ..QuoteFilters::default()
            };
            let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
            assert_eq!(contents(&page.items), ["The secret of getting ahead"]);
            assert_eq!(page.total_count, 1);
        }

        let filters = QuoteFilters {
            author: Some("Mark".to_string()),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn should_require_all_tags_with_comma_and_any_tag_with_pipe() {
        let fx = setup().await;
        fx.quote("both", fx.seneca, &["a", "b"]).await;
        fx.quote("only a", fx.seneca, &["a"]).await;
        fx.quote("only b", fx.seneca, &["b"]).await;
        fx.quote("neither", fx.seneca, &["c"]).await;

        let sort = ListOptions::new(Sort::new(SortField::Content, None), 1, 20).unwrap();

        let all = QuoteFilters {
            tags: TagFilter::parse("a,b"),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&all, sort).await.unwrap();
        assert_eq!(contents(&page.items), ["both"]);

        let any = QuoteFilters {
            tags: TagFilter::parse("a|b"),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&any, sort).await.unwrap();
        assert_eq!(contents(&page.items), ["both", "only a", "only b"]);
    }

    #[tokio::test]
    async fn should_ignore_deleted_tags_when_filtering() {
        let fx = setup().await;
        fx.quote("tagged", fx.seneca, &["gone"]).await;
        let tag = fx.tags.get_by_names(&["gone".to_string()]).await.unwrap();
        fx.tags.delete(tag[0].id).await.unwrap();

        let filters = QuoteFilters {
            tags: TagFilter::parse("gone"),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn should_bound_content_length_inclusively() {
        let fx = setup().await;
        for content in ["four", "fiver", "ten chars!", "eleven char"] {
            fx.quote(content, fx.seneca, &[]).await;
        }

        let filters = QuoteFilters {
            min_length: Some(5),
            max_length: Some(10),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.items.iter().all(|q| (5..=10).contains(&q.length())));
    }

    #[tokio::test]
    async fn should_count_length_in_characters() {
        let fx = setup().await;
        fx.quote("ééééé", fx.seneca, &[]).await;

        let filters = QuoteFilters {
            max_length: Some(5),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn should_match_search_terms_as_prefixes_joined_by_or() {
        let fx = setup().await;
        fx.quote("Life is long if you know how to use it", fx.seneca, &[]).await;
        fx.quote("Whoever loves becomes humble", fx.seneca, &[]).await;
        fx.quote("Courage is grace under pressure", fx.twain, &[]).await;

        let filters = QuoteFilters {
            query: Some("lif, lov".to_string()),
            ..QuoteFilters::default()
        };
        let options = ListOptions::new(Sort::new(SortField::Content, None), 1, 20).unwrap();
        let page = fx.quotes.index(&filters, options).await.unwrap();
        assert_eq!(
            contents(&page.items),
            ["Life is long if you know how to use it", "Whoever loves becomes humble"]
        );
    }

    #[tokio::test]
    async fn should_treat_search_operators_as_plain_text() {
        let fx = setup().await;
        fx.quote("Not all those who wander are lost", fx.seneca, &[]).await;

        let filters = QuoteFilters {
            query: Some("NOT \"wand".to_string()),
            ..QuoteFilters::default()
        };
        let page = fx.quotes.index(&filters, ListOptions::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn should_keep_search_index_in_sync_with_updates() {
        let fx = setup().await;
        let quote = fx.quote("original words", fx.seneca, &[]).await;
        fx.quotes
            .update(
                quote.id,
                QuoteChanges {
                    content: Some("replacement text".to_string()),
                },
                None,
            )
            .await
            .unwrap();

        let search = |text: &str| QuoteFilters {
            query: Some(text.to_string()),
            ..QuoteFilters::default()
        };
        let old = fx.quotes.index(&search("original"), ListOptions::default()).await.unwrap();
        let new = fx.quotes.index(&search("replace"), ListOptions::default()).await.unwrap();
        assert_eq!(old.total_count, 0);
        assert_eq!(new.total_count, 1);
    }

    #[tokio::test]
    async fn should_paginate_and_sort_index() {
        let fx = setup().await;
        for content in ["c", "a", "e", "b", "d"] {
            fx.quote(content, fx.seneca, &[]).await;
        }

        let options =
            ListOptions::new(Sort::new(SortField::Content, Some(SortOrder::Desc)), 2, 2).unwrap();
        let page = fx.quotes.index(&QuoteFilters::default(), options).await.unwrap();
        assert_eq!(contents(&page.items), ["c", "b"]);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn should_sort_by_author_name() {
        let fx = setup().await;
        fx.quote("by seneca", fx.seneca, &[]).await;
        fx.quote("by twain", fx.twain, &[]).await;

        let options = ListOptions::new(Sort::new(SortField::Author, None), 1, 20).unwrap();
        let page = fx.quotes.index(&QuoteFilters::default(), options).await.unwrap();
        assert_eq!(contents(&page.items), ["by twain", "by seneca"]);
    }

    #[tokio::test]
    async fn should_sort_random_sample_by_requested_field() {
        let fx = setup().await;
        for content in ["delta", "alpha", "echo", "charlie", "bravo"] {
            fx.quote(content, fx.seneca, &[]).await;
        }

        let sort = Sort::new(SortField::Content, Some(SortOrder::Asc));
        let sample = fx
            .quotes
            .random_many(&QuoteFilters::default(), 3, sort)
            .await
            .unwrap();
        assert_eq!(sample.len(), 3);
        assert!(sample.windows(2).all(|w| w[0].content < w[1].content));

        let everything = fx
            .quotes
            .random_many(&QuoteFilters::default(), 50, sort)
            .await
            .unwrap();
        assert_eq!(contents(&everything), ["alpha", "bravo", "charlie", "delta", "echo"]);
    }

    #[tokio::test]
    async fn should_pick_random_quote_among_matches_only() {
        let fx = setup().await;
        fx.quote("short", fx.seneca, &[]).await;
        fx.quote("a considerably longer quote", fx.seneca, &[]).await;

        let filters = QuoteFilters {
            min_length: Some(10),
            ..QuoteFilters::default()
        };
        for _ in 0..5 {
            let quote = fx.quotes.random(&filters).await.unwrap().unwrap();
            assert_eq!(quote.content, "a considerably longer quote");
        }

        let nothing = QuoteFilters {
            min_length: Some(1000),
            ..QuoteFilters::default()
        };
        assert!(fx.quotes.random(&nothing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_create_many_in_one_batch() {
        let fx = setup().await;
        let news: Vec<NewQuote> = (1..=4)
            .map(|i| NewQuote {
                content: format!("batch quote {i}"),
                author_id: fx.twain,
            })
            .collect();
        let wanted: Vec<String> = news.iter().map(|q| q.content.clone()).collect();

        let created = fx.quotes.create_many(news, None).await.unwrap();
        assert_eq!(created.len(), 4);

        let fetched = fx.quotes.get_by_contents(&wanted).await.unwrap();
        assert_eq!(fetched.len(), 4);
        assert_eq!(
            contents(&fetched),
            wanted.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn should_discard_batch_created_in_rolled_back_transaction() {
        let fx = setup().await;
        let mut tx = fx.quotes.begin().await.unwrap();
        let created = fx
            .quotes
            .create_many(
                vec![NewQuote {
                    content: "never committed".to_string(),
                    author_id: fx.seneca,
                }],
                Some(&mut tx),
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        fx.quotes.rollback(tx).await.unwrap();

        let fetched = fx
            .quotes
            .get_by_contents(&["never committed".to_string()])
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn should_return_none_when_updating_or_deleting_missing_quote() {
        let fx = setup().await;
        let changes = QuoteChanges {
            content: Some("anything".to_string()),
        };
        assert!(fx.quotes.update(QuoteId::new(7), changes, None).await.unwrap().is_none());
        assert!(fx.quotes.delete(QuoteId::new(7), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_bump_updated_at_only_when_content_changes() {
        let fx = setup().await;
        let quote = fx.quote("same", fx.seneca, &[]).await;

        let unchanged = fx
            .quotes
            .update(quote.id, QuoteChanges { content: None }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.updated_at, quote.updated_at);

        let changed = fx
            .quotes
            .update(
                quote.id,
                QuoteChanges {
                    content: Some("different".to_string()),
                },
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed.content, "different");
        assert!(changed.updated_at >= quote.updated_at);

        let fetched = fx.quotes.get_by_id(quote.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "different");
    }

    #[tokio::test]
    async fn should_delete_quote_and_detach_tags_through_service() {
        let fx = setup().await;
        let quote = fx.quote("ephemeral", fx.seneca, &["t1", "t2"]).await;
        let service = DeleteQuoteService::new(fx.quotes.clone());

        let deleted = service.delete_quote(quote.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted());

        let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quote_tag WHERE quote_id = ?")
            .bind(quote.id.as_i64())
            .fetch_one(&fx.pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
        assert!(fx.quotes.get_by_id(quote.id).await.unwrap().is_none());
        assert!(fx.quotes.get_by_contents(&["ephemeral".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_leave_quote_undeleted_when_detach_fails() {
        let fx = setup().await;
        let quote = fx.quote("resilient", fx.seneca, &["t1"]).await;
        sqlx::query(
            "CREATE TRIGGER block_detach BEFORE DELETE ON quote_tag BEGIN SELECT RAISE(ABORT, 'detach blocked'); END;",
        )
        .execute(&fx.pool)
        .await
        .unwrap();
        let service = DeleteQuoteService::new(fx.quotes.clone());

        let result = service.delete_quote(quote.id).await;
        assert!(matches!(result, Err(QuotebookError::Storage(_))));

        let fetched = fx.quotes.get_by_id(quote.id).await.unwrap().unwrap();
        assert!(!fetched.is_deleted());
        assert_eq!(fetched.tags, ["t1"]);
    }
}
