//! `SQLite` implementation of [`TagRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use quotebook_app::ports::TagRepository;
use quotebook_domain::error::QuotebookError;
use quotebook_domain::id::TagId;
use quotebook_domain::tag::{NewTag, Tag};
use quotebook_domain::time::now;

use crate::error::StorageError;
use crate::timestamp::{self, decode_column};

/// Wrapper for converting database rows into domain [`Tag`].
struct Wrapper(Tag);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        let deleted_at: Option<String> = row.try_get("deleted_at")?;

        Ok(Self(Tag {
            id: TagId::new(id),
            name: row.try_get("name")?,
            created_at: decode_column(&created_at)?,
            updated_at: decode_column(&updated_at)?,
            deleted_at: deleted_at.as_deref().map(decode_column).transpose()?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO tags (name, created_at, updated_at)
    VALUES (?, ?, ?)
    RETURNING *
";
const SELECT_LIVE: &str = "SELECT * FROM tags WHERE deleted_at IS NULL ORDER BY name, id";
const SELECT_LIVE_BY_NAMES: &str = "SELECT * FROM tags WHERE deleted_at IS NULL AND name IN (";
const SOFT_DELETE: &str = r"
    UPDATE tags SET deleted_at = ?, updated_at = ?
    WHERE id = ? AND deleted_at IS NULL
    RETURNING *
";

/// `SQLite`-backed tag repository.
#[derive(Clone)]
pub struct SqliteTagRepository {
    pool: SqlitePool,
}

impl SqliteTagRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TagRepository for SqliteTagRepository {
    async fn create(&self, tag: NewTag) -> Result<Tag, QuotebookError> {
        let ts = timestamp::encode(now());
        let row: Wrapper = sqlx::query_as(INSERT)
            .bind(&tag.name)
            .bind(&ts)
            .bind(&ts)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(id = %row.0.id, name = %row.0.name, "created tag");
        Ok(row.0)
    }

    async fn get_all(&self) -> Result<Vec<Tag>, QuotebookError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_LIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_by_names(&self, names: &[String]) -> Result<Vec<Tag>, QuotebookError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_LIVE_BY_NAMES);
        let mut list = builder.separated(", ");
        for name in names {
            list.push_bind(name.clone());
        }
        list.push_unseparated(") ORDER BY name, id");

        let rows: Vec<Wrapper> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn delete(&self, id: TagId) -> Result<Option<Tag>, QuotebookError> {
        let ts = timestamp::encode(now());
        let row: Option<Wrapper> = sqlx::query_as(SOFT_DELETE)
            .bind(&ts)
            .bind(&ts)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(%id, found = row.is_some(), "soft-deleted tag");
        Ok(row.map(|w| w.0))
    }
}
