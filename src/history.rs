use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use tracing::warn;

/// The log at one point in time. `seq` goes up by one on every append or
/// clear, so a client can discard a snapshot older than one it already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub seq:     u64,
    pub entries: Vec<String>,
}

/// Every change is pushed here as a full snapshot, in mutation order.
pub type ChangeTx = mpsc::Sender<Snapshot>;

#[derive(Default)]
struct Log {
    entries: VecDeque<String>,
    seq:     u64,
}

impl Log {
    fn snapshot(&self) -> Snapshot {
        Snapshot { seq: self.seq, entries: self.entries.iter().cloned().collect() }
    }
}

/* ------------ bounded roll log ------------ */
#[derive(Clone)]
pub struct HistoryLog {
    log:    Arc<RwLock<Log>>,
    cap:    usize,
    notify: Option<ChangeTx>,
}

impl HistoryLog {
    pub fn new(cap: usize) -> Self {
        Self { log: Arc::default(), cap: cap.max(1), notify: None }
    }

    /// Like `new`, but each append/clear also queues the resulting snapshot.
    pub fn with_notify(cap: usize, tx: ChangeTx) -> Self {
        Self { notify: Some(tx), ..Self::new(cap) }
    }

    pub fn capacity(&self) -> usize { self.cap }

    pub async fn append(&self, entry: String) {
        let mut lg = self.log.write().await;
        lg.entries.push_back(entry);
        while lg.entries.len() > self.cap {
            lg.entries.pop_front();
        }
        lg.seq += 1;
        self.changed(&lg).await;
    }

    /// Oldest first.
    pub async fn snapshot(&self) -> Vec<String> {
        self.log.read().await.entries.iter().cloned().collect()
    }

    /// Entries plus the sequence number they belong to.
    pub async fn versioned(&self) -> Snapshot {
        self.log.read().await.snapshot()
    }

    pub async fn clear(&self) {
        let mut lg = self.log.write().await;
        lg.entries.clear();
        lg.seq += 1;
        self.changed(&lg).await;
    }

    // still under the write guard, so queued snapshots follow mutation order.
    // The consumer never waits on a socket, so this send only waits on a
    // short in-memory backlog.
    async fn changed(&self, lg: &Log) {
        let Some(tx) = &self.notify else { return };
        if tx.send(lg.snapshot()).await.is_err() {
            warn!("history change queue closed, broadcast skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_exceeds_capacity() {
        let h = HistoryLog::new(3);
        for i in 0..10 {
            h.append(format!("roll {i}")).await;
            assert!(h.snapshot().await.len() <= 3);
        }
        assert_eq!(h.snapshot().await, vec!["roll 7", "roll 8", "roll 9"]);
    }

    #[tokio::test]
    async fn evicts_oldest_after_cap_plus_one() {
        let h = HistoryLog::new(4);
        for i in 0..5 {
            h.append(i.to_string()).await;
        }
        let snap = h.snapshot().await;
        assert!(!snap.contains(&"0".to_string()));
        assert_eq!(snap, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn clear_empties() {
        let h = HistoryLog::new(5);
        h.append("a".into()).await;
        h.append("b".into()).await;
        h.clear().await;
        assert!(h.snapshot().await.is_empty());
        h.clear().await;
        assert!(h.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_a_copy() {
        let h = HistoryLog::new(5);
        h.append("a".into()).await;
        let snap = h.snapshot().await;
        h.append("b".into()).await;
        assert_eq!(snap, vec!["a"]);
    }

    #[tokio::test]
    async fn zero_capacity_is_bumped_to_one() {
        let h = HistoryLog::new(0);
        h.append("a".into()).await;
        h.append("b".into()).await;
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.snapshot().await, vec!["b"]);
    }

    #[tokio::test]
    async fn every_mutation_bumps_seq() {
        let h = HistoryLog::new(5);
        assert_eq!(h.versioned().await, Snapshot::default());
        h.append("a".into()).await;
        h.clear().await;
        h.append("b".into()).await;
        assert_eq!(h.versioned().await, Snapshot { seq: 3, entries: vec!["b".into()] });
    }

    #[tokio::test]
    async fn changes_are_queued_in_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let h = HistoryLog::with_notify(2, tx);
        h.append("a".into()).await;
        h.append("b".into()).await;
        h.append("c".into()).await;
        h.clear().await;

        let got: Vec<Snapshot> = vec![
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ];
        assert_eq!(got.iter().map(|s| s.seq).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(got[0].entries, vec!["a"]);
        assert_eq!(got[1].entries, vec!["a", "b"]);
        assert_eq!(got[2].entries, vec!["b", "c"]);
        assert!(got[3].entries.is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_keep_queue_in_log_order() {
        let (tx, mut rx) = mpsc::channel(256);
        let h = HistoryLog::with_notify(100, tx);
        let mut tasks = Vec::new();
        for i in 0..50 {
            let h = h.clone();
            tasks.push(tokio::spawn(async move { h.append(i.to_string()).await }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        // each snapshot extends the previous one by exactly one entry
        let mut prev = Snapshot::default();
        for _ in 0..50 {
            let snap = rx.recv().await.unwrap();
            assert_eq!(snap.seq, prev.seq + 1);
            assert_eq!(snap.entries.len(), prev.entries.len() + 1);
            assert_eq!(&snap.entries[..prev.entries.len()], &prev.entries[..]);
            prev = snap;
        }
        assert_eq!(prev, h.versioned().await);
    }
}
