//! JSON REST handlers for quotes.

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use quotebook_app::ports::{AuthorRepository, QuoteRepository, TagRepository};
use quotebook_app::services::quote_service::ImportItem;
use quotebook_domain::error::{NotFoundError, ValidationError};
use quotebook_domain::id::{AuthorId, QuoteId, TagId};
use quotebook_domain::query::Page;
use quotebook_domain::quote::{NewQuote, Quote, QuoteChanges};

use super::params::QuoteQueryParams;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a quote.
#[derive(Deserialize)]
pub struct CreateQuoteRequest {
    pub content: String,
    pub author_id: AuthorId,
}

/// One element of the import request body.
#[derive(Deserialize)]
pub struct ImportQuoteRequest {
    pub content: String,
    pub author_id: AuthorId,
    /// Names of existing tags to attach.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating a quote.
#[derive(Deserialize)]
pub struct UpdateQuoteRequest {
    pub content: Option<String>,
}

/// Request body for attaching tags to a quote.
#[derive(Deserialize)]
pub struct AttachTagsRequest {
    pub tag_ids: Vec<TagId>,
}

/// Paginated listing body.
#[derive(Serialize)]
pub struct QuotePage {
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub results: Vec<Quote>,
}

impl From<Page<Quote>> for QuotePage {
    fn from(page: Page<Quote>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            page: page.page,
            limit: page.limit,
            total_count: page.total_count,
            results: page.items,
        }
    }
}

#[derive(Serialize)]
pub struct AttachTagsBody {
    pub attached: u64,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<QuotePage>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from endpoints returning several quotes.
pub enum ManyResponse {
    Ok(Json<Vec<Quote>>),
    Created(Json<Vec<Quote>>),
}

impl IntoResponse for ManyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from endpoints returning a single quote.
pub enum OneResponse {
    Ok(Json<Quote>),
    Created(Json<Quote>),
}

impl IntoResponse for OneResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the attach endpoint.
pub enum AttachResponse {
    Ok(Json<AttachTagsBody>),
}

impl IntoResponse for AttachResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_id(raw: &str) -> Result<QuoteId, ApiError> {
    QuoteId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_owned()).into())
}

fn missing(id: QuoteId) -> ApiError {
    NotFoundError {
        entity: "Quote",
        id: id.to_string(),
    }
    .into()
}

/// `GET /api/quotes`
pub async fn list<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Query(params): Query<QuoteQueryParams>,
) -> Result<ListResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let options = params.list_options()?;
    let page = state
        .quote_service
        .list_quotes(&params.filters(), options)
        .await?;
    Ok(ListResponse::Ok(Json(page.into())))
}

/// `GET /api/quotes/random`
pub async fn random_list<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Query(params): Query<QuoteQueryParams>,
) -> Result<ManyResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let sort = params.sort()?;
    let quotes = state
        .quote_service
        .random_quotes(&params.filters(), params.random_limit(), sort)
        .await?;
    Ok(ManyResponse::Ok(Json(quotes)))
}

/// `GET /api/random`
pub async fn random<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Query(params): Query<QuoteQueryParams>,
) -> Result<OneResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let quote = state
        .quote_service
        .random_quote(&params.filters())
        .await?
        .ok_or_else(|| NotFoundError {
            entity: "Quote",
            id: "matching the filters".to_string(),
        })?;
    Ok(OneResponse::Ok(Json(quote)))
}

/// `GET /api/quotes/:id`
pub async fn get<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(id): Path<String>,
) -> Result<OneResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let quote = state.quote_service.get_quote(parse_id(&id)?).await?;
    Ok(OneResponse::Ok(Json(quote)))
}

/// `POST /api/quotes`
pub async fn create<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<OneResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let quote = NewQuote::builder()
        .content(req.content)
        .author_id(req.author_id)
        .build()?;
    let created = state.quote_service.create_quote(quote).await?;
    Ok(OneResponse::Created(Json(created)))
}

/// `POST /api/quotes/import`
///
/// Creates every quote and attaches its tags in one transaction. Tag names
/// must refer to existing tags.
pub async fn import<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Json(req): Json<Vec<ImportQuoteRequest>>,
) -> Result<ManyResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let names: Vec<String> = req
        .iter()
        .flat_map(|item| item.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let known = state.tag_service.find_by_names(&names).await?;

    let mut items = Vec::with_capacity(req.len());
    for item in req {
        let mut tag_ids = Vec::with_capacity(item.tags.len());
        for name in &item.tags {
            let tag = known
                .iter()
                .find(|tag| &tag.name == name)
                .ok_or_else(|| NotFoundError {
                    entity: "Tag",
                    id: name.clone(),
                })?;
            tag_ids.push(tag.id);
        }
        items.push(ImportItem {
            quote: NewQuote {
                content: item.content,
                author_id: item.author_id,
            },
            tag_ids,
        });
    }

    let created = state.quote_service.import_quotes(items).await?;
    let ids: Vec<QuoteId> = created.iter().map(|quote| quote.id).collect();
    let quotes = state.quote_service.get_quotes(&ids).await?;
    Ok(ManyResponse::Created(Json(quotes)))
}

/// `PATCH /api/quotes/:id`
pub async fn update<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuoteRequest>,
) -> Result<OneResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let changes = QuoteChanges {
        content: req.content,
    };
    let quote = state
        .quote_service
        .update_quote(id, changes)
        .await?
        .ok_or_else(|| missing(id))?;
    Ok(OneResponse::Ok(Json(quote)))
}

/// `DELETE /api/quotes/:id`
///
/// Responds with the deleted quote.
pub async fn delete<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(id): Path<String>,
) -> Result<OneResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let quote = state
        .delete_quote_service
        .delete_quote(id)
        .await?
        .ok_or_else(|| missing(id))?;
    Ok(OneResponse::Ok(Json(quote)))
}

/// `POST /api/quotes/:id/tags`
pub async fn attach_tags<QR, AR, TR>(
    State(state): State<AppState<QR, AR, TR>>,
    Path(id): Path<String>,
    Json(req): Json<AttachTagsRequest>,
) -> Result<AttachResponse, ApiError>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    let attached = state
        .quote_service
        .attach_tags(parse_id(&id)?, &req.tag_ids)
        .await?;
    Ok(AttachResponse::Ok(Json(AttachTagsBody { attached })))
}
