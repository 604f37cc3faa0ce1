//! Connected clients and fan-out.
//!
//! Two levels: the client map (short-held, never across I/O) and, per
//! connection, a bounded outbound queue drained by that connection's own
//! writer task. Only the writer touches the socket, so writes to one
//! connection never interleave, and a stuck socket only stalls its own writer.
use std::{collections::HashMap, fmt::Display, marker::PhantomData, sync::Arc, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{stream::SplitSink, Sink, SinkExt};
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError, RwLock},
    time::timeout,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub type ConnId = Uuid;

/// The hub the server actually runs: write halves of axum websockets.
pub type WsHub = Hub<SplitSink<WebSocket, Message>>;

/// Payloads a client may have waiting before it counts as stalled.
pub const CLIENT_QUEUE: usize = 32;
/// Longest a single write may take before the client is dropped.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("client {0} is not connected")]
    Unknown(ConnId),

    #[error("write failed: {0}")]
    Write(String),
}

type Clients = Arc<RwLock<HashMap<ConnId, mpsc::Sender<String>>>>;

pub struct Hub<S> {
    clients:       Clients,
    queue:         usize,
    write_timeout: Duration,
    _sink:         PhantomData<fn(S)>,
}

impl<S> Clone for Hub<S> {
    fn clone(&self) -> Self {
        Self {
            clients:       self.clients.clone(),
            queue:         self.queue,
            write_timeout: self.write_timeout,
            _sink:         PhantomData,
        }
    }
}

impl<S> Default for Hub<S> {
    fn default() -> Self {
        Self::new(CLIENT_QUEUE, WRITE_TIMEOUT)
    }
}

impl<S> Hub<S> {
    pub fn new(queue: usize, write_timeout: Duration) -> Self {
        Self { clients: Arc::default(), queue: queue.max(1), write_timeout, _sink: PhantomData }
    }
}

impl<S> Hub<S>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
{
    /// Adds the connection and starts its writer task.
    pub async fn register(&self, sink: S) -> ConnId {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue);
        self.clients.write().await.insert(id, tx);
        tokio::spawn(writer(id, sink, rx, self.clients.clone(), self.write_timeout));
        id
    }

    /// Drops the connection; its writer flushes what is queued and closes
    /// the sink. Unknown ids are ignored.
    pub async fn unregister(&self, id: ConnId) {
        self.clients.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Queues a payload for one client, waiting for room in its queue.
    /// Bounded by the write timeout: a stuck writer gives up and drops the client.
    pub async fn send_to(&self, id: ConnId, payload: String) -> Result<(), TransportError> {
        let tx = self.clients.read().await.get(&id).cloned();
        let tx = tx.ok_or(TransportError::Unknown(id))?;
        tx.send(payload)
            .await
            .map_err(|_| TransportError::Write(format!("client {id} went away")))
    }

    /// Queues `payload` for every client and returns how many took it.
    /// Never waits on a socket: a client whose queue is full is dropped.
    pub async fn publish(&self, payload: &str) -> usize {
        let mut delivered = 0;
        let mut dropped   = Vec::new();

        for (id, tx) in self.clients.read().await.iter() {
            match tx.try_send(payload.to_owned()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%id, "outbound queue full, dropping client");
                    dropped.push(*id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(*id),
            }
        }

        if !dropped.is_empty() {
            let mut m = self.clients.write().await;
            for id in &dropped {
                m.remove(id);
            }
        }
        debug!(delivered, dropped = dropped.len(), "published");
        delivered
    }
}

/* ---------------- one per connection ---------------- */
async fn writer<S>(id: ConnId, mut sink: S, mut rx: mpsc::Receiver<String>, clients: Clients, limit: Duration)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(payload) = rx.recv().await {
        let err = match timeout(limit, sink.send(Message::Text(payload))).await {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(_)     => format!("no progress in {limit:?}"),
        };
        warn!(%id, error = %err, "write failed, dropping client");
        break;
    }

    clients.write().await.remove(&id);
    // wake anyone still waiting in send_to before the close below
    drop(rx);
    let _ = timeout(limit, sink.close()).await;
    debug!(%id, "writer stopped");
}
