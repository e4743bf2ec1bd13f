use axum::extract::{rejection::JsonRejection, Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::todo_service::{parse_day, today, TodoService};
use crate::domain::todo::{TodoFilter, TodoId};
use crate::http::types::{parse_id, ApiError};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

#[derive(Deserialize)]
struct ListParams { date: Option<String>, from: Option<String> }

#[derive(Deserialize)]
struct CreateBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    target_date: Option<String>,
}

#[derive(Deserialize)]
struct IdParams { id: Option<String> }

/// `?date=` lists one day; otherwise `?from=` (default today) lists that day onward.
async fn list_todos<S: TodoService>(State(state): State<AppState<S>>, Query(params): Query<ListParams>) -> Result<Json<Value>, ApiError> {
    let today = today();
    let day = |raw: &str| parse_day(raw, today).ok_or(ApiError::BadRequest("invalid_date"));
    let filter = match (params.date.as_deref(), params.from.as_deref()) {
        (Some(date), _) => TodoFilter::On(day(date)?),
        (None, Some(from)) => TodoFilter::From(day(from)?),
        (None, None) => TodoFilter::From(today),
    };
    let todos = state.service.list(filter).await.map_err(|e| ApiError::from_service(e, "failed_to_load"))?;
    Ok(Json(json!({ "todos": todos })))
}

async fn create_todo<S: TodoService>(State(state): State<AppState<S>>, payload: Result<Json<CreateBody>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let Ok(Json(body)) = payload else { return Err(ApiError::BadRequest("invalid_todo")) };
    let todo = state
        .service
        .add(body.text.as_deref().unwrap_or_default(), body.target_date.as_deref().unwrap_or_default())
        .await
        .map_err(|e| ApiError::from_service(e, "failed_to_create"))?;
    Ok(Json(json!({ "todo": todo })))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Query(params): Query<IdParams>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(params.id.as_deref())?;
    state.service.delete(TodoId(id)).await.map_err(|e| ApiError::from_service(e, "failed_to_delete"))?;
    Ok(Json(json!({ "ok": true })))
}
