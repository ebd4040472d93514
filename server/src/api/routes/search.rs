//! Entity search endpoints
//!
//! Every entity kind gets `GET /{entity}` (filtered, paged list) and
//! `GET /{entity}/{id}`. The filter travels in `_s`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::{IdPath, ValidatedQuery};
use crate::api::types::{ApiError, PaginationMeta, SearchParams, SearchResponse};
use crate::core::QueryConfig;
use crate::data::SearchRepository;
use crate::entities::EntityKind;

/// Shared state for search endpoints
#[derive(Clone)]
pub struct SearchApiState {
    pub repository: Arc<dyn SearchRepository>,
    pub limits: QueryConfig,
}

/// Build search routes for all entity kinds
pub fn routes(repository: Arc<dyn SearchRepository>, limits: QueryConfig) -> Router<()> {
    let state = SearchApiState { repository, limits };

    EntityKind::ALL
        .into_iter()
        .fold(Router::<SearchApiState>::new(), |router, kind| {
            router
                .route(
                    &format!("/{}", kind.name()),
                    get(
                        move |state: State<SearchApiState>,
                              params: ValidatedQuery<SearchParams>| {
                            list_entities(kind, state, params)
                        },
                    ),
                )
                .route(
                    &format!("/{}/{{id}}", kind.name()),
                    get(move |state: State<SearchApiState>, path: IdPath| {
                        get_entity(kind, state, path)
                    }),
                )
        })
        .with_state(state)
}

/// Search entities with a filter expression
#[utoipa::path(
    get,
    path = "/api/v1/{entity}",
    tag = "search",
    params(
        ("entity" = String, Path, description = "alarms, events, nodes, notifications or outages"),
        SearchParams
    ),
    responses(
        (status = 200, description = "Matching records", body = SearchResponse),
        (status = 204, description = "No records on this page"),
        (status = 400, description = "Malformed filter or parameters", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Filter could not be executed", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn list_entities(
    kind: EntityKind,
    State(state): State<SearchApiState>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Result<Response, ApiError> {
    let request = params.into_request(&state.limits)?;
    tracing::debug!(
        entity = %kind,
        query = %request.query,
        limit = request.limit,
        offset = request.offset,
        "Searching"
    );

    let page = state
        .repository
        .search(kind, &request)
        .await
        .map_err(ApiError::from_data)?;

    if page.records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(SearchResponse {
        data: page.records,
        meta: PaginationMeta {
            limit: request.limit,
            offset: request.offset,
            total_count: page.total,
        },
    })
    .into_response())
}

/// Get one record by id
#[utoipa::path(
    get,
    path = "/api/v1/{entity}/{id}",
    tag = "search",
    params(
        ("entity" = String, Path, description = "alarms, events, nodes, notifications or outages"),
        ("id" = i64, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record keyed by field name"),
        (status = 400, description = "Id is not an integer", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such record", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_entity(
    kind: EntityKind,
    State(state): State<SearchApiState>,
    path: IdPath,
) -> Result<Response, ApiError> {
    let record = state
        .repository
        .get_by_id(kind, path.id)
        .await
        .map_err(ApiError::from_data)?;

    match record {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(ApiError::not_found(
            "NOT_FOUND",
            format!("{} {} was not found", kind.label(), path.id),
        )),
    }
}
