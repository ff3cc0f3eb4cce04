//! HTTP gateway.
//!
//! Routes map one-to-one onto query and mutation operations. Every error is
//! answered with an empty body and a status code only.

pub mod handlers;
pub mod payload;

use crate::core::StoreError;
use crate::mutation::MutationService;
use crate::query::QueryEngine;
use crate::storage::EntityStore;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub queries: QueryEngine,
    pub mutations: MutationService,
}

impl AppState {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            queries: QueryEngine::new(Arc::clone(&store)),
            mutations: MutationService::new(store),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/users/:id",
            get(handlers::get_user).post(handlers::post_user),
        )
        .route("/users/:id/visits", get(handlers::list_user_visits))
        .route(
            "/locations/:id",
            get(handlers::get_location).post(handlers::post_location),
        )
        .route("/locations/:id/avg", get(handlers::location_average))
        .route(
            "/visits/:id",
            get(handlers::get_visit).post(handlers::post_visit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
pub enum WebError {
    Store(StoreError),
    /// The path did not name an entity (unparsable id).
    NotFound,
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        WebError::Store(err)
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound | WebError::Store(StoreError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            WebError::Store(err) if err.is_bad_request() => StatusCode::BAD_REQUEST,
            WebError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
