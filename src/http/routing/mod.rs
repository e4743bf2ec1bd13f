pub mod debug;
pub mod google;
pub mod keywords;
pub mod todos;
pub mod weather;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::{google_service::GoogleService, keyword_service::KeywordService, todo_service::TodoService, weather_service::WeatherService};
use crate::config::Config;

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .layer(TraceLayer::new_for_http())
}

/// Everything the dashboard routes need.
pub struct Dashboard<T, K> {
    pub todos: T,
    pub keywords: K,
    pub weather: WeatherService,
    pub google: GoogleService,
    pub config: Arc<Config>,
}

pub fn dashboard<T, K>(deps: Dashboard<T, K>) -> Router
where
    T: TodoService + Clone,
    K: KeywordService + Clone,
{
    let cookies = google::CookieSettings::from_config(&deps.config);
    app(todos::router(todos::AppState { service: deps.todos })
        .merge(keywords::router(keywords::AppState { service: deps.keywords }))
        .merge(weather::router(weather::AppState { service: deps.weather }))
        .merge(google::router(google::AppState { service: deps.google, cookies }))
        .merge(debug::router(debug::AppState { config: deps.config })))
}
