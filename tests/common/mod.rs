#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::Router;
use dashboard::{build_app, config::Config};
use tower::ServiceExt;

/// In-memory store; upstream URLs point nowhere unless a test overrides them.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.weather.api_url = "http://127.0.0.1:9/v1/forecast".to_string();
    config.google.token_url = "http://127.0.0.1:9/token".to_string();
    config.google.calendar_api = "http://127.0.0.1:9/calendar/v3".to_string();
    config
}

pub async fn app_with(config: Config) -> Router {
    build_app(config).await.unwrap()
}

pub async fn app() -> Router {
    app_with(test_config()).await
}

pub async fn request(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>) -> hyper::Response<Body> {
    send(app, method, path, body, None).await
}

pub async fn send(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>, cookie: Option<&str>) -> hyper::Response<Body> {
    let mut req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    if let Some(cookie) = cookie {
        req = req.header("cookie", cookie);
    }
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

pub async fn json_body(res: hyper::Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

/// `Set-Cookie` headers of a response.
pub fn set_cookies(res: &hyper::Response<Body>) -> Vec<String> {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
