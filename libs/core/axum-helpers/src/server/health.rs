use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response body.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

/// Router exposing `GET /health` for liveness probes.
///
/// Readiness (`/ready`), which checks downstream dependencies, is the
/// application's responsibility since it owns the connections.
pub fn health_router(service: impl Into<String>) -> Router {
    let service = service.into();

    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "ok",
                service,
            })
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route_responds_ok() {
        let app = health_router("test-service");

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "test-service");
    }
}
