use axum::extract::{rejection::JsonRejection, Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::keyword_service::KeywordService;
use crate::domain::keyword::KeywordId;
use crate::http::types::{parse_id, ApiError};

#[derive(Clone)]
pub struct AppState<S: KeywordService> { pub service: S }

pub fn router<S: KeywordService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/keywords", get(list_keywords::<S>).post(create_keyword::<S>).delete(delete_keyword::<S>))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateBody {
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Deserialize)]
struct IdParams { id: Option<String> }

async fn list_keywords<S: KeywordService>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError> {
    let keywords = state.service.list().await.map_err(|e| ApiError::from_service(e, "failed_to_load"))?;
    Ok(Json(json!({ "keywords": keywords })))
}

async fn create_keyword<S: KeywordService>(State(state): State<AppState<S>>, payload: Result<Json<CreateBody>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let Ok(Json(body)) = payload else { return Err(ApiError::BadRequest("invalid_keyword")) };
    let keyword = state
        .service
        .add(body.keyword.as_deref().unwrap_or_default())
        .await
        .map_err(|e| ApiError::from_service(e, "failed_to_create"))?;
    Ok(Json(json!({ "keyword": keyword })))
}

async fn delete_keyword<S: KeywordService>(State(state): State<AppState<S>>, Query(params): Query<IdParams>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(params.id.as_deref())?;
    state.service.delete(KeywordId(id)).await.map_err(|e| ApiError::from_service(e, "failed_to_delete"))?;
    Ok(Json(json!({ "ok": true })))
}
