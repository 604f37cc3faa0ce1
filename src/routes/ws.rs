use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, Extension},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{stream::StreamExt, Sink, Stream};
use std::fmt::Display;
use tracing::{debug, info};

use crate::{
    error::bad,
    history::HistoryLog,
    hub::{Hub, WsHub},
    protocol::{Inbound, Outbound},
    service,
};

pub fn router() -> Router {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(history): Extension<HistoryLog>,
    Extension(hub): Extension<WsHub>,
) -> impl IntoResponse {
    ws.on_upgrade(move |s| user_ws(s, history, hub))
}

async fn user_ws(sock: WebSocket, history: HistoryLog, hub: WsHub) {
    let (sink, stream) = sock.split();
    session(stream, sink, history, hub).await
}

/* ---------------- per client ---------------- */
/// Registers the write half, greets with the current history, then answers
/// requests until the read half ends or errors.
pub async fn session<St, E, S>(mut stream: St, sink: S, history: HistoryLog, hub: Hub<S>)
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
{
    let id      = hub.register(sink).await;
    let clients = hub.len().await;
    info!(%id, clients, "client connected");

    let hello = Outbound::from(history.versioned().await).to_json();
    if hub.send_to(id, hello).await.is_ok() {
        while let Some(msg) = stream.next().await {
            let raw = match msg {
                Ok(Message::Text(raw)) => raw,
                Ok(Message::Close(_))  => break,
                Ok(_)                  => continue,
                Err(e) => {
                    debug!(%id, error = %e, "read failed");
                    break;
                }
            };
            let reply = handle(&raw, &history).await.to_json();
            if hub.send_to(id, reply).await.is_err() {
                break;
            }
        }
    }

    hub.unregister(id).await;
    info!(%id, "client disconnected");
}

/// Answers one client message. History changes reach every client through
/// the broadcaster, not through this reply. A `history` reply carries its
/// `seq`, so it may be newer than broadcasts still queued for this client.
pub async fn handle(raw: &str, history: &HistoryLog) -> Outbound {
    let req = match serde_json::from_str::<Inbound>(raw) {
        Ok(r) => r,
        Err(e) => return Outbound::error(bad(e)),
    };

    match req {
        Inbound::Roll { expression, mode } => match service::roll(history, &expression, mode).await {
            Ok(out) => Outbound::RollResult { text: out.text },
            Err(e)  => Outbound::error(e),
        },
        Inbound::History => history.versioned().await.into(),
        Inbound::ClearHistory => {
            history.clear().await;
            Outbound::Ok { message: "Roll history cleared".into() }
        }
    }
}
