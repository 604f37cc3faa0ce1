use axum::extract::ws::Message;
use futures_util::Sink;
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{history::Snapshot, hub::Hub, protocol::Outbound};

/// Single consumer of history changes: each snapshot becomes one publish, in
/// the order the log was mutated.
pub async fn task<S>(mut rx: mpsc::Receiver<Snapshot>, hub: Hub<S>)
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
{
    while let Some(snap) = rx.recv().await {
        let seq     = snap.seq;
        let payload = Outbound::from(snap).to_json();
        let sent    = hub.publish(&payload).await;
        debug!(seq, clients = sent, "history broadcast");
    }
    info!("history queue closed, broadcaster stopping");
}
