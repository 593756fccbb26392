//! Fire-and-forget audit writes.
//!
//! Entries go through a bounded queue drained by a single worker task. A full
//! or closed queue drops the entry with a warning, and a failed write is
//! reported through `tracing` and never retried. Nothing here can fail the
//! request that produced the entry.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::model::logs::NewLogEntry;
use crate::store::LogStore;

pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 256;

/// Cloneable handle that enqueues audit entries without waiting.
#[derive(Clone, Debug)]
pub struct AuditLogger {
    sender: mpsc::Sender<NewLogEntry>,
}

impl AuditLogger {
    /// Start the writer task. It exits once every handle has been dropped and
    /// the queue is drained.
    pub fn spawn(store: Arc<dyn LogStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_writer(store, receiver));
        (Self { sender }, worker)
    }

    pub fn record(&self, entry: NewLogEntry) {
        match self.sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                warn!(
                    user_id = entry.user_id,
                    command = %entry.command,
                    "audit queue full; dropping log entry"
                );
            }
            Err(TrySendError::Closed(entry)) => {
                warn!(
                    user_id = entry.user_id,
                    command = %entry.command,
                    "audit writer stopped; dropping log entry"
                );
            }
        }
    }
}

async fn run_writer(store: Arc<dyn LogStore>, mut receiver: mpsc::Receiver<NewLogEntry>) {
    while let Some(entry) = receiver.recv().await {
        if let Err(source) = store.append_log(&entry).await {
            error!(
                ?source,
                user_id = entry.user_id,
                command = %entry.command,
                "failed to write request log entry"
            );
        }
    }

    debug!("audit writer drained");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::AuditLogger;
    use crate::memory::MemoryStore;
    use crate::model::logs::{LogFilter, LogPage, LogRecord, NewLogEntry, Pagination};
    use crate::store::LogStore;

    #[derive(Default)]
    struct BrokenLogStore {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl LogStore for BrokenLogStore {
        async fn append_log(&self, _entry: &NewLogEntry) -> anyhow::Result<LogRecord> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("connection refused")
        }

        async fn query_logs(
            &self,
            _filter: &LogFilter,
            _pagination: Option<Pagination>,
        ) -> anyhow::Result<LogPage> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn writes_every_recorded_entry() {
        let store = Arc::new(MemoryStore::new());
        let (audit, worker) = AuditLogger::spawn(store.clone(), 8);

        audit.record(NewLogEntry::new(1, "/start", "hello"));
        audit.record(NewLogEntry::new(2, "/clearcity", "nothing"));
        drop(audit);
        worker.await.unwrap();

        let page = store.query_logs(&LogFilter::default(), None).await.unwrap();
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn failed_writes_are_attempted_once_and_swallowed() {
        let store = Arc::new(BrokenLogStore::default());
        let (audit, worker) = AuditLogger::spawn(store.clone(), 8);

        audit.record(NewLogEntry::new(1, "/start", "hello"));
        audit.record(NewLogEntry::new(1, "/start", "hello"));
        drop(audit);
        worker.await.unwrap();

        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn recording_after_shutdown_does_not_panic() {
        let store = Arc::new(MemoryStore::new());
        let (audit, worker) = AuditLogger::spawn(store, 1);
        worker.abort();
        let _ = worker.await;

        audit.record(NewLogEntry::new(1, "/start", "hello"));
    }
}
