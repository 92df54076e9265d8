//! API route definitions
//!
//! - POST /predict_risk - score one reading
//! - GET  /status       - model availability and provenance
//! - GET  /health       - liveness

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ApiState};

/// All service routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/predict_risk", post(handlers::predict_risk))
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::ModelContext;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        ApiState::new(ModelContext::absent())
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_route() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_route_accepts_empty_object() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict_risk")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
