//! JSON REST handlers for tags.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use quotebook_app::ports::{AuthorRepository, QuoteRepository, TagRepository};
use quotebook_domain::error::ValidationError;
use quotebook_domain::id::TagId;
use quotebook_domain::tag::{NewTag, Tag};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a tag.
#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Tag>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create and delete endpoints.
pub enum TagResponse {
    Ok(Json<Tag>),
    Created(Json<Tag>),
}

impl IntoResponse for TagResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/tags`
pub async fn list<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
) -> Result<ListResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let tags = state.tag_service.list_tags().await?;
    Ok(ListResponse::Ok(Json(tags)))
}

/// `POST /api/tags`
pub async fn create<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Json(req): Json<CreateTagRequest>,
) -> Result<TagResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let created = state.tag_service.create_tag(NewTag::new(req.name)).await?;
    Ok(TagResponse::Created(Json(created)))
}

/// `DELETE /api/tags/:id`
///
/// Soft-deletes the tag and responds with it.
pub async fn delete<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(id): Path<String>,
) -> Result<TagResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let tag_id = TagId::from_str(&id).map_err(|_| ValidationError::InvalidId(id.clone()))?;
    let deleted = state.tag_service.delete_tag(tag_id).await?;
    Ok(TagResponse::Ok(Json(deleted)))
}
