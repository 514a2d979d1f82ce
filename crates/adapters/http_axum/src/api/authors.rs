//! JSON REST handlers for authors.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use quotebook_app::ports::{AuthorRepository, QuoteRepository, TagRepository};
use quotebook_domain::author::{Author, NewAuthor};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an author.
#[derive(Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
}

impl From<CreateAuthorRequest> for NewAuthor {
    fn from(req: CreateAuthorRequest) -> Self {
        match req.slug {
            Some(slug) => NewAuthor {
                name: req.name,
                slug,
            },
            None => NewAuthor::from_name(req.name),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Author>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Author>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Author>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/authors`
pub async fn list<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
) -> Result<ListResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let authors = state.author_service.list_authors().await?;
    Ok(ListResponse::Ok(Json(authors)))
}

/// `GET /api/authors/:slug`
pub async fn get<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(slug): Path<String>,
) -> Result<GetResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let author = state.author_service.get_author_by_slug(&slug).await?;
    Ok(GetResponse::Ok(Json(author)))
}

/// `POST /api/authors`
pub async fn create<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Json(req): Json<CreateAuthorRequest>,
) -> Result<CreateResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let created = state.author_service.create_author(req.into()).await?;
    Ok(CreateResponse::Created(Json(created)))
}
