//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod authors;
pub mod params;
#[allow(clippy::missing_errors_doc)]
pub mod quotes;
#[allow(clippy::missing_errors_doc)]
pub mod tags;

use axum::Router;
use axum::routing::{delete, get, post};

use quotebook_app::ports::{AuthorRepository, QuoteRepository, TagRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<QR, AR, TR>() -> Router<AppState<QR, AR, TR>>
where
    QR: QuoteRepository + Send + Sync + 'static,
    AR: AuthorRepository + Send + Sync + 'static,
    TR: TagRepository + Send + Sync + 'static,
{
    Router::new()
        // Quotes
        .route(
            "/quotes",
            get(quotes::list::<QR, AR, TR>).post(quotes::create::<QR, AR, TR>),
        )
        .route("/quotes/random", get(quotes::random_list::<QR, AR, TR>))
        .route("/quotes/import", post(quotes::import::<QR, AR, TR>))
        .route(
            "/quotes/{id}",
            get(quotes::get::<QR, AR, TR>)
                .patch(quotes::update::<QR, AR, TR>)
                .delete(quotes::delete::<QR, AR, TR>),
        )
        .route("/quotes/{id}/tags", post(quotes::attach_tags::<QR, AR, TR>))
        .route("/random", get(quotes::random::<QR, AR, TR>))
        // Authors
        .route(
            "/authors",
            get(authors::list::<QR, AR, TR>).post(authors::create::<QR, AR, TR>),
        )
        .route("/authors/{slug}", get(authors::get::<QR, AR, TR>))
        // Tags
        .route(
            "/tags",
            get(tags::list::<QR, AR, TR>).post(tags::create::<QR, AR, TR>),
        )
        .route("/tags/{id}", delete(tags::delete::<QR, AR, TR>))
}
