//! Shared API types
//!
//! Error responses, search parameters and the paging envelope shared by the
//! entity endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::QueryConfig;
use crate::data::{CategoryRow, DataError, EntityRecord, IpInterfaceRow, MonitoredServiceRow};
use crate::query::{OrderDirection, QueryError, SearchRequest};

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "INTERNAL".to_string(),
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Map a filter translation failure to a response.
    ///
    /// Client input problems become 400 with the error's code. Execution
    /// failures keep their message; anything else is reported opaquely.
    pub fn from_query(e: QueryError) -> Self {
        if e.is_client_error() {
            tracing::debug!(code = e.code(), error = %e, "Rejected filter expression");
            return Self::bad_request(e.code(), e.to_string());
        }
        match e {
            QueryError::QueryExecution(_) => {
                tracing::error!(error = %e, "Query execution failed");
                Self::Internal {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
            other => {
                tracing::error!(error = %other, "Unexpected query error");
                Self::internal("An unexpected error occurred")
            }
        }
    }

    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::Query(q) => Self::from_query(q),
            e if e.is_transient() => {
                tracing::warn!(error = %e, "Transient data error");
                Self::service_unavailable("Database is busy, try again later")
            }
            e => {
                tracing::error!(error = %e, "Data error");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { code, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                code,
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Error body shape, for the OpenAPI document
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

/// Query parameters accepted by every entity list endpoint
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Filter expression, e.g. `severity=ge=MAJOR;nodeId==2`
    #[serde(rename = "_s")]
    pub filter: Option<String>,
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Field to sort by, defaults to the entity's ordering
    pub order_by: Option<String>,
    /// `asc` or `desc`
    pub order: Option<String>,
}

impl SearchParams {
    /// Apply configured defaults and bounds
    pub fn into_request(self, limits: &QueryConfig) -> Result<SearchRequest, ApiError> {
        let limit = self.limit.unwrap_or(limits.default_limit);
        if limit > limits.max_limit {
            return Err(ApiError::bad_request(
                "VALIDATION_ERROR",
                format!("limit must be between 1 and {}", limits.max_limit),
            ));
        }

        let direction = match self.order.as_deref() {
            None | Some("") => OrderDirection::Asc,
            Some(s) => OrderDirection::parse(s).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_ORDER",
                    format!("Invalid order '{}'. Use 'asc' or 'desc'", s),
                )
            })?,
        };

        Ok(SearchRequest {
            query: self.filter.unwrap_or_default(),
            limit,
            offset: self.offset.unwrap_or(0),
            order_by: self.order_by.unwrap_or_default(),
            direction,
        })
    }
}

/// Pagination metadata in response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub limit: u32,
    pub offset: u32,
    pub total_count: u64,
}

/// One page of entity records
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<EntityRecord>,
    pub meta: PaginationMeta,
}

/// Unpaged node list
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeListResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<EntityRecord>,
    pub total_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IpInterfaceListResponse {
    pub data: Vec<IpInterfaceRow>,
    pub total_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListResponse {
    pub data: Vec<MonitoredServiceRow>,
    pub total_count: u64,
}

/// Returned with a 400 when no categories were requested
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    pub message: String,
    pub data: Vec<CategoryRow>,
}
