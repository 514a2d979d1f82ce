//! `SQLite` implementation of [`AuthorRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use quotebook_app::ports::AuthorRepository;
use quotebook_domain::author::{Author, NewAuthor};
use quotebook_domain::error::QuotebookError;
use quotebook_domain::id::AuthorId;
use quotebook_domain::time::now;

use crate::error::StorageError;
use crate::timestamp::{self, decode_column};

/// Wrapper for converting database rows into domain [`Author`].
struct Wrapper(Author);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Author {
            id: AuthorId::new(id),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            created_at: decode_column(&created_at)?,
            updated_at: decode_column(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO authors (name, slug, created_at, updated_at)
    VALUES (?, ?, ?, ?)
    RETURNING *
";
const SELECT_BY_SLUG: &str = "SELECT * FROM authors WHERE slug = ?";
const SELECT_ALL: &str = "SELECT * FROM authors ORDER BY name, id";

/// `SQLite`-backed author repository.
#[derive(Clone)]
pub struct SqliteAuthorRepository {
    pool: SqlitePool,
}

impl SqliteAuthorRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuthorRepository for SqliteAuthorRepository {
    async fn create(&self, author: NewAuthor) -> Result<Author, QuotebookError> {
        let ts = timestamp::encode(now());
        let row: Wrapper = sqlx::query_as(INSERT)
            .bind(&author.name)
            .bind(&author.slug)
            .bind(&ts)
            .bind(&ts)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(id = %row.0.id, slug = %row.0.slug, "created author");
        Ok(row.0)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Author>, QuotebookError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SLUG)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn get_all(&self) -> Result<Vec<Author>, QuotebookError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
