//! routes/roll.rs — HTTP pass-through for callers without a websocket
use axum::{
    extract::{Extension, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::{
    dice::RollMode,
    error::AppResult,
    history::HistoryLog,
    protocol::Outbound,
    roller::RollOutcome,
    service,
};

#[derive(Deserialize)]
struct RollInput {
    #[serde(alias = "prompt")]
    expression: String,
    #[serde(default, alias = "rollType")]
    mode: RollMode,
}

pub fn router() -> Router {
    Router::new()
        .route("/roll", post(roll))
        .route("/history", get(history).delete(clear))
}

async fn roll(
    Extension(log): Extension<HistoryLog>,
    Json(p): Json<RollInput>,
) -> AppResult<Json<RollOutcome>> {
    Ok(Json(service::roll(&log, &p.expression, p.mode).await?))
}

async fn history(Extension(log): Extension<HistoryLog>) -> Json<Outbound> {
    Json(log.versioned().await.into())
}

async fn clear(Extension(log): Extension<HistoryLog>) -> Json<Outbound> {
    log.clear().await;
    Json(Outbound::Ok { message: "Roll history cleared".into() })
}
