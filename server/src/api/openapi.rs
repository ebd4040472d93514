//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, nodes, search};
use crate::api::types::{
    CategoryListResponse, ErrorResponse, IpInterfaceListResponse, NodeListResponse,
    PaginationMeta, SearchResponse, ServiceListResponse,
};
use crate::data::{CategoryRow, IpInterfaceRow, MonitoredServiceRow};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NmsQuery API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Filter-expression search over alarms, events, nodes, notifications and outages"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "search", description = "Filtered entity search"),
        (name = "nodes", description = "Node inventory")
    ),
    paths(
        health::health,
        search::list_entities,
        search::get_entity,
        nodes::list_ip_interfaces,
        nodes::get_ip_interface,
        nodes::list_services,
        nodes::get_service,
        nodes::nodes_by_categories,
        nodes::nodes_by_category,
        nodes::missing_foreign_source,
        nodes::nodes_by_foreign_source,
    ),
    components(schemas(
        health::HealthResponse,
        ErrorResponse,
        PaginationMeta,
        SearchResponse,
        NodeListResponse,
        IpInterfaceListResponse,
        ServiceListResponse,
        CategoryListResponse,
        IpInterfaceRow,
        MonitoredServiceRow,
        CategoryRow,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>NmsQuery API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
