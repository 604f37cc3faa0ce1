use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;

use crate::{
    dice::{ModeError, ParseError},
    protocol::Outbound,
};

pub type AppResult<T> = Result<T, AppErr>;

#[derive(thiserror::Error, Debug)]
pub enum AppErr {
    #[error("Bad request: {0}")]
    Bad(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error("Config: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AppErr {
    /// Caller's fault: reported back, never fatal.
    pub fn is_client(&self) -> bool {
        matches!(self, AppErr::Bad(_) | AppErr::Parse(_) | AppErr::Mode(_))
    }
}

impl IntoResponse for AppErr {
    fn into_response(self) -> axum::response::Response {
        let code = if self.is_client() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (code, Json(Outbound::error(self))).into_response()
    }
}

/* ── helpers: wrap any error as Bad / Config ── */
pub fn bad<E: Display>(e: E) -> AppErr { AppErr::Bad(e.to_string()) }

pub fn config<E: Display>(key: &str, e: E) -> AppErr {
    AppErr::Config(format!("{key}: {e}"))
}
