use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::{config, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub addr:        SocketAddr,
    pub history_cap: usize,
    pub queue_cap:   usize,
    pub static_dir:  PathBuf,
    /// Per-client outbound queue; a client this far behind is dropped.
    pub client_queue:  usize,
    pub write_timeout: Duration,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let cfg = Config {
            addr:        var(&get, "DICE_ADDR", "0.0.0.0:8080")?,
            history_cap: var(&get, "DICE_HISTORY_CAP", "20")?,
            queue_cap:   var(&get, "DICE_QUEUE_CAP", "100")?,
            static_dir:  var(&get, "DICE_STATIC_DIR", "static")?,
            client_queue:  var(&get, "DICE_CLIENT_QUEUE", "32")?,
            write_timeout: Duration::from_millis(var(&get, "DICE_WRITE_TIMEOUT_MS", "5000")?),
        };
        if cfg.history_cap == 0 {
            return Err(config("DICE_HISTORY_CAP", "must be at least 1"));
        }
        if cfg.queue_cap == 0 {
            return Err(config("DICE_QUEUE_CAP", "must be at least 1"));
        }
        if cfg.client_queue == 0 {
            return Err(config("DICE_CLIENT_QUEUE", "must be at least 1"));
        }
        if cfg.write_timeout.is_zero() {
            return Err(config("DICE_WRITE_TIMEOUT_MS", "must be at least 1"));
        }
        Ok(cfg)
    }
}

fn var<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e| config(key, e))
}
