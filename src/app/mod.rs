pub mod response;
pub mod routes;

use crate::core::engine::CourseEngine;
use crate::core::gateway::CourseGateway;
use crate::domain::ports::Storage;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use response::ApiError;

pub struct AppState<S: Storage> {
    pub engine: Arc<CourseEngine>,
    pub gateway: Arc<CourseGateway<S>>,
    pub request_timeout: Duration,
}

impl<S: Storage> AppState<S> {
    pub fn new(engine: CourseEngine, gateway: CourseGateway<S>, request_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            gateway: Arc::new(gateway),
            request_timeout,
        }
    }
}

impl<S: Storage> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            gateway: Arc::clone(&self.gateway),
            request_timeout: self.request_timeout,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// 路徑同時接受有無結尾斜線
pub fn build_router<S: Storage + 'static>(state: AppState<S>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/generate-learning-path/",
            post(routes::generate_learning_path::<S>),
        )
        .route(
            "/generate-learning-path",
            post(routes::generate_learning_path::<S>),
        )
        .route("/upload-course-to-s3", post(routes::upload_course::<S>))
        .route("/upload-course-to-s3/", post(routes::upload_course::<S>))
        .route("/get-course/{course_id}", get(routes::get_course::<S>))
        .route("/list-courses/", get(routes::list_courses::<S>))
        .route("/list-courses", get(routes::list_courses::<S>))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
