//! Request extractors that reject with the JSON error envelope

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Raw path extractor for record routes (internal use)
#[derive(Debug, Deserialize)]
struct IdPathRaw {
    id: String,
}

/// Validated numeric record id from `/{id}`.
///
/// Returns a 400 Bad Request when the segment is not an integer.
#[derive(Debug)]
pub struct IdPath {
    pub id: i64,
}

fn parse_id(raw: &str) -> Result<i64, ValidationRejection> {
    raw.parse::<i64>()
        .map_err(|_| ValidationRejection::InvalidId(raw.to_string()))
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<IdPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        Ok(Self {
            id: parse_id(&raw.id)?,
        })
    }
}

/// Raw path extractor for interface routes (internal use)
#[derive(Debug, Deserialize)]
struct IpInterfacePathRaw {
    id: String,
    ip_address: String,
}

/// Validated `/{id}/ipinterfaces/{ip_address}` path
#[derive(Debug)]
pub struct IpInterfacePath {
    pub id: i64,
    pub ip_address: String,
}

impl<S> FromRequestParts<S> for IpInterfacePath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<IpInterfacePathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        Ok(Self {
            id: parse_id(&raw.id)?,
            ip_address: raw.ip_address,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ServicePathRaw {
    id: String,
    ip_address: String,
    service_name: String,
}

/// Validated `/{id}/ipinterfaces/{ip_address}/services/{service_name}` path
#[derive(Debug)]
pub struct ServicePath {
    pub id: i64,
    pub ip_address: String,
    pub service_name: String,
}

impl<S> FromRequestParts<S> for ServicePath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<ServicePathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        Ok(Self {
            id: parse_id(&raw.id)?,
            ip_address: raw.ip_address,
            service_name: raw.service_name,
        })
    }
}

/// Why a request was rejected before reaching a handler
pub enum ValidationRejection {
    /// Path segments did not deserialize
    Path(PathRejection),
    /// Record id is not an integer
    InvalidId(String),
    /// Query string did not deserialize
    Query(QueryRejection),
    /// A `validator` rule failed
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                "PATH_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::InvalidId(raw) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                format!("Invalid id '{}': must be an integer", raw),
            ),
            Self::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "QUERY_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        tracing::debug!(code, message = %message, "Rejected request");
        (
            status,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// `Query<T>` followed by `T::validate()`
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    use crate::api::types::SearchParams;

    fn router() -> Router {
        Router::new()
            .route("/items/{id}", get(|p: IdPath| async move { p.id.to_string() }))
            .route(
                "/items/{id}/ipinterfaces/{ip_address}",
                get(|p: IpInterfacePath| async move { format!("{}@{}", p.ip_address, p.id) }),
            )
            .route(
                "/items/{id}/ipinterfaces/{ip_address}/services/{service_name}",
                get(|p: ServicePath| async move {
                    format!("{}/{}@{}", p.ip_address, p.service_name, p.id)
                }),
            )
            .route(
                "/search",
                get(|q: ValidatedQuery<SearchParams>| async move {
                    q.filter.clone().unwrap_or_default()
                }),
            )
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_id_path() {
        assert_eq!(call("/items/42").await, (StatusCode::OK, "42".to_string()));

        let (status, body) = call("/items/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_ID"));
    }

    #[tokio::test]
    async fn test_ip_interface_path() {
        assert_eq!(
            call("/items/2/ipinterfaces/10.0.0.1").await,
            (StatusCode::OK, "10.0.0.1@2".to_string())
        );
        let (status, _) = call("/items/x/ipinterfaces/10.0.0.1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_service_path() {
        assert_eq!(
            call("/items/2/ipinterfaces/10.0.0.1/services/ICMP").await,
            (StatusCode::OK, "10.0.0.1/ICMP@2".to_string())
        );
        let (status, body) = call("/items/2.5/ipinterfaces/10.0.0.1/services/ICMP").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_ID"));
    }

    #[tokio::test]
    async fn test_validated_query_decodes_filter() {
        let (status, body) = call("/search?_s=label%3D%3Dweb01%3Btype%3D%3DA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "label==web01;type==A");
    }

    #[tokio::test]
    async fn test_validated_query_rejections() {
        let (status, body) = call("/search?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("VALIDATION_ERROR"));
        assert!(body.contains("limit must be at least 1"));

        let (status, body) = call("/search?limit=ten").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("QUERY_PARSE_ERROR"));
    }
}
