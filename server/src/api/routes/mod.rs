//! API route handlers

pub mod health;
pub mod nodes;
pub mod search;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::data::{DuckdbService, SearchRepository};

    /// In-memory store loaded with the sample data set
    pub async fn seeded_repository() -> Arc<dyn SearchRepository> {
        let service = Arc::new(DuckdbService::open_in_memory(Duration::from_secs(30)).unwrap());
        service.seed().await.unwrap();
        Arc::new(service)
    }

    /// Issue a GET and decode the body (`Null` for an empty body)
    pub async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        if bytes.is_empty() {
            return (status, serde_json::Value::Null);
        }
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
