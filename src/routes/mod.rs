use axum::{routing::get, Router};

pub mod roll;
pub mod ws;

pub fn router() -> Router {
    Router::new()
        .nest("/api",   roll::router())
        .merge(ws::router())
        .route("/health", get(|| async { "OK" }))
}
