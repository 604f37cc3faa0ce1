use tokio::sync::mpsc;

use crate::{config::Config, history::HistoryLog, hub::WsHub, utils::broadcast};

/* ------------ shared handles ------------ */
#[derive(Clone)]
pub struct AppState {
    pub history: HistoryLog,
    pub hub:     WsHub,
}

impl AppState {
    /// Builds the store and hub, and starts the task that fans history
    /// changes out to every client.
    pub fn start(cfg: &Config) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue_cap);
        let history  = HistoryLog::with_notify(cfg.history_cap, tx);
        let hub      = WsHub::new(cfg.client_queue, cfg.write_timeout);

        tokio::spawn(broadcast::task(rx, hub.clone()));
        Self { history, hub }
    }
}
