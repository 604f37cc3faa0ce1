mod config;
mod dice;
mod error;
mod history;
mod hub;
mod protocol;
mod roller;
mod service;
mod state;
mod utils {
    pub mod broadcast;
}
mod routes;

use axum::{Extension, Router};
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, state::AppState};
use error::AppErr;

#[tokio::main]
async fn main() -> Result<(), AppErr> {
    let cfg = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let st  = AppState::start(&cfg);
    let cap = st.history.capacity();

    let app = Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .layer(Extension(st.history))
        .layer(Extension(st.hub));

    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    info!(addr = %cfg.addr, history_cap = cap, "dice server listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
