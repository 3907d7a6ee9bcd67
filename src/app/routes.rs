use super::response::ApiError;
use super::AppState;
use crate::domain::model::{Course, CourseRequest, CourseSummary, StoredCourse};
use crate::domain::ports::Storage;
use crate::utils::error::CourseError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct CourseList {
    pub courses: Vec<CourseSummary>,
}

/// JSON 解析失敗一律視為請求欄位錯誤
fn body_error(rejection: JsonRejection) -> ApiError {
    ApiError(CourseError::ValidationError {
        field: "body".to_string(),
        message: rejection.body_text(),
    })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate_learning_path<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CourseRequest>, JsonRejection>,
) -> Result<Json<Course>, ApiError> {
    let Json(request) = payload.map_err(body_error)?;

    match tokio::time::timeout(state.request_timeout, state.engine.generate_course(&request)).await
    {
        Ok(course) => Ok(Json(course?)),
        Err(_) => Err(CourseError::Timeout {
            seconds: state.request_timeout.as_secs(),
        }
        .into()),
    }
}

pub async fn upload_course<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Course>, JsonRejection>,
) -> Result<Json<StoredCourse>, ApiError> {
    let Json(course) = payload.map_err(body_error)?;
    Ok(Json(state.gateway.store(&course).await?))
}

pub async fn get_course<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(state.gateway.fetch(&course_id).await?))
}

pub async fn list_courses<S: Storage + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<CourseList>, ApiError> {
    let courses = state.gateway.list().await?;
    tracing::debug!("Listing {} stored course(s)", courses.len());
    Ok(Json(CourseList { courses }))
}
