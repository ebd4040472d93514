//! Node inventory endpoints
//!
//! Interface, service, category and provisioning-source views of the node table.
//! Mounted next to the generic search routes under `/nodes`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::{IdPath, IpInterfacePath, ServicePath};
use crate::api::types::{
    ApiError, CategoryListResponse, IpInterfaceListResponse, NodeListResponse,
    ServiceListResponse,
};
use crate::data::{EntityRecord, SearchRepository};

/// Shared state for node inventory endpoints
#[derive(Clone)]
pub struct NodesApiState {
    pub repository: Arc<dyn SearchRepository>,
}

/// Build node inventory routes
pub fn routes(repository: Arc<dyn SearchRepository>) -> Router<()> {
    let state = NodesApiState { repository };

    Router::new()
        .route("/nodes/{id}/ipinterfaces", get(list_ip_interfaces))
        .route(
            "/nodes/{id}/ipinterfaces/{ip_address}",
            get(get_ip_interface),
        )
        .route(
            "/nodes/{id}/ipinterfaces/{ip_address}/services",
            get(list_services),
        )
        .route(
            "/nodes/{id}/ipinterfaces/{ip_address}/services/{service_name}",
            get(get_service),
        )
        .route("/nodes/categories", get(nodes_by_categories))
        .route("/nodes/categories/{category}", get(nodes_by_category))
        .route("/nodes/foreignSource", get(missing_foreign_source))
        .route(
            "/nodes/foreignSource/{foreign_source}",
            get(nodes_by_foreign_source),
        )
        .with_state(state)
}

fn node_list(nodes: Vec<EntityRecord>) -> Response {
    if nodes.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let total_count = nodes.len() as u64;
    Json(NodeListResponse {
        data: nodes,
        total_count,
    })
    .into_response()
}

/// List a node's IP interfaces
#[utoipa::path(
    get,
    path = "/api/v1/nodes/{id}/ipinterfaces",
    tag = "nodes",
    params(("id" = i64, Path, description = "Node id")),
    responses(
        (status = 200, description = "Interfaces ordered by address", body = IpInterfaceListResponse),
        (status = 204, description = "Node has no IP interfaces"),
        (status = 404, description = "No such node", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn list_ip_interfaces(
    State(state): State<NodesApiState>,
    path: IdPath,
) -> Result<Response, ApiError> {
    let interfaces = state
        .repository
        .list_ip_interfaces(path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found("NOT_FOUND", format!("Node {} was not found", path.id))
        })?;

    if interfaces.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let total_count = interfaces.len() as u64;
    Ok(Json(IpInterfaceListResponse {
        data: interfaces,
        total_count,
    })
    .into_response())
}

/// Get one IP interface of a node
#[utoipa::path(
    get,
    path = "/api/v1/nodes/{id}/ipinterfaces/{ip_address}",
    tag = "nodes",
    params(
        ("id" = i64, Path, description = "Node id"),
        ("ip_address" = String, Path, description = "Interface address")
    ),
    responses(
        (status = 200, description = "Interface", body = crate::data::IpInterfaceRow),
        (status = 404, description = "No such interface", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_ip_interface(
    State(state): State<NodesApiState>,
    path: IpInterfacePath,
) -> Result<Response, ApiError> {
    let interface = state
        .repository
        .get_ip_interface(path.id, &path.ip_address)
        .await
        .map_err(ApiError::from_data)?;

    match interface {
        Some(row) => Ok(Json(row).into_response()),
        None => Err(ApiError::not_found(
            "NOT_FOUND",
            format!(
                "IP interface {} on node {} was not found",
                path.ip_address, path.id
            ),
        )),
    }
}

/// List the services monitored on one interface
#[utoipa::path(
    get,
    path = "/api/v1/nodes/{id}/ipinterfaces/{ip_address}/services",
    tag = "nodes",
    params(
        ("id" = i64, Path, description = "Node id"),
        ("ip_address" = String, Path, description = "Interface address")
    ),
    responses(
        (status = 200, description = "Services ordered by name", body = ServiceListResponse),
        (status = 204, description = "Interface has no monitored services"),
        (status = 400, description = "Node id is not an integer", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such interface", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn list_services(
    State(state): State<NodesApiState>,
    path: IpInterfacePath,
) -> Result<Response, ApiError> {
    let services = state
        .repository
        .list_services(path.id, &path.ip_address)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found(
                "NOT_FOUND",
                format!(
                    "IP interface {} on node {} was not found",
                    path.ip_address, path.id
                ),
            )
        })?;

    if services.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let total_count = services.len() as u64;
    Ok(Json(ServiceListResponse {
        data: services,
        total_count,
    })
    .into_response())
}

/// Get one monitored service by name
#[utoipa::path(
    get,
    path = "/api/v1/nodes/{id}/ipinterfaces/{ip_address}/services/{service_name}",
    tag = "nodes",
    params(
        ("id" = i64, Path, description = "Node id"),
        ("ip_address" = String, Path, description = "Interface address"),
        ("service_name" = String, Path, description = "Service name, e.g. ICMP")
    ),
    responses(
        (status = 200, description = "Service", body = crate::data::MonitoredServiceRow),
        (status = 400, description = "Node id is not an integer", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such service", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_service(
    State(state): State<NodesApiState>,
    path: ServicePath,
) -> Result<Response, ApiError> {
    let service = state
        .repository
        .get_service(path.id, &path.ip_address, &path.service_name)
        .await
        .map_err(ApiError::from_data)?;

    match service {
        Some(row) => Ok(Json(row).into_response()),
        None => Err(ApiError::not_found(
            "NOT_FOUND",
            format!(
                "Service {} on {} of node {} was not found",
                path.service_name, path.ip_address, path.id
            ),
        )),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoriesQuery {
    /// Comma-separated category names
    pub q: Option<String>,
}

/// Nodes in any of the listed categories
#[utoipa::path(
    get,
    path = "/api/v1/nodes/categories",
    tag = "nodes",
    params(CategoriesQuery),
    responses(
        (status = 200, description = "Matching nodes ordered by label", body = NodeListResponse),
        (status = 204, description = "Categories exist but hold no nodes"),
        (status = 400, description = "No categories given, lists the known ones", body = CategoryListResponse)
    )
)]
pub async fn nodes_by_categories(
    State(state): State<NodesApiState>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Response, ApiError> {
    let names: Vec<String> = query
        .q
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        let categories = state
            .repository
            .list_categories()
            .await
            .map_err(ApiError::from_data)?;
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(CategoryListResponse {
                message: "Please specify a set of categories in the 'q' parameter".to_string(),
                data: categories,
            }),
        )
            .into_response());
    }

    let nodes = state
        .repository
        .nodes_by_categories(&names)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::bad_request("INVALID_CATEGORY", "Please specify a set of valid categories")
        })?;

    Ok(node_list(nodes))
}

/// Nodes in one category
#[utoipa::path(
    get,
    path = "/api/v1/nodes/categories/{category}",
    tag = "nodes",
    params(("category" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Nodes ordered by label", body = NodeListResponse),
        (status = 204, description = "Category holds no nodes"),
        (status = 400, description = "Unknown category", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn nodes_by_category(
    State(state): State<NodesApiState>,
    Path(category): Path<String>,
) -> Result<Response, ApiError> {
    let nodes = state
        .repository
        .nodes_by_category(&category)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::bad_request("INVALID_CATEGORY", "Please specify a valid category"))?;

    Ok(node_list(nodes))
}

/// Placeholder route that tells callers to name a source
#[utoipa::path(
    get,
    path = "/api/v1/nodes/foreignSource",
    tag = "nodes",
    responses(
        (status = 400, description = "No foreign source given", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn missing_foreign_source() -> ApiError {
    ApiError::bad_request(
        "MISSING_FOREIGN_SOURCE",
        "Please specify a valid foreignSource",
    )
}

/// Nodes provisioned from one foreign source
#[utoipa::path(
    get,
    path = "/api/v1/nodes/foreignSource/{foreign_source}",
    tag = "nodes",
    params(("foreign_source" = String, Path, description = "Provisioning requisition name")),
    responses(
        (status = 200, description = "Nodes ordered by label", body = NodeListResponse),
        (status = 204, description = "No nodes from this source")
    )
)]
pub async fn nodes_by_foreign_source(
    State(state): State<NodesApiState>,
    Path(foreign_source): Path<String>,
) -> Result<Response, ApiError> {
    let nodes = state
        .repository
        .nodes_by_foreign_source(&foreign_source)
        .await
        .map_err(ApiError::from_data)?;

    Ok(node_list(nodes))
}
