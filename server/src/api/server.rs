//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{health, nodes, search};
use crate::core::constants::API_PREFIX;
use crate::core::{CoreApp, QueryConfig};
use crate::data::SearchRepository;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);

        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let repository: Arc<dyn SearchRepository> = Arc::new(Arc::clone(&app.database));
        let router = build_router(repository, app.config.query, &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP listener bound");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Assemble the full router: API routes, docs, fallback and layers
fn build_router(
    repository: Arc<dyn SearchRepository>,
    limits: QueryConfig,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .merge(search::routes(Arc::clone(&repository), limits))
        .merge(nodes::routes(repository));

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest(API_PREFIX, api_routes)
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::api::routes::testing::{get_json, seeded_repository};

    async fn router() -> Router {
        build_router(
            seeded_repository().await,
            QueryConfig::default(),
            &AllowedOrigins::new("127.0.0.1", 8980),
        )
    }

    #[tokio::test]
    async fn test_routes_are_mounted_under_prefix() {
        let (status, body) = get_json(router().await, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get_json(router().await, "/api/v1/notifications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["totalCount"], 3);

        let (status, body) = get_json(router().await, "/api/v1/nodes/categories/Servers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 2);
    }

    #[tokio::test]
    async fn test_node_record_and_inventory_routes_coexist() {
        let (status, body) = get_json(router().await, "/api/v1/nodes/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], "db01");

        let (status, body) = get_json(router().await, "/api/v1/nodes/3/ipinterfaces").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["ipAddress"], "10.0.0.20");

        let (status, body) =
            get_json(router().await, "/api/v1/nodes/2/ipinterfaces/10.0.0.1/services/SNMP").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serviceName"], "SNMP");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, body) = get_json(router().await, "/api/v1/widgets").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_and_docs() {
        let (status, body) = get_json(router().await, "/api/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].is_object());

        let response = router()
            .await
            .oneshot(Request::get("/api/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_local_origin() {
        let response = router()
            .await
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/v1/alarms")
                    .header(header::ORIGIN, "http://localhost:8980")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:8980")
        );
    }
}
