//! Debounced autosave.
//!
//! ```text
//!  schedule(s1) schedule(s2) schedule(s3)          (quiet)
//!      |            |            |<------ debounce ------>|
//!      v            v            v                        v
//!   pending=s1   pending=s2   pending=s3              write(s3)
//! ```
//!
//! A background task owns a single pending slot. Each new value replaces the
//! slot and pushes the deadline out; only the value present when the deadline
//! elapses is written. Write failures are logged and dropped; the next edit
//! schedules another attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use manzai_types::Script;

use crate::store::{KvStore, save_script};

/// Default quiet period before a write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

enum Command {
    Schedule(Script),
    Flush(oneshot::Sender<()>),
}

/// Handle to the autosave task.
///
/// Dropping the handle closes the channel; the task writes whatever is still
/// pending before it exits.
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl Autosaver {
    /// Start the autosave task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn KvStore>, key: impl Into<String>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, key.into(), debounce, rx));
        Self { tx, task }
    }

    /// Queue `script` for writing after the quiet period. Never blocks.
    pub fn schedule(&self, script: Script) {
        if self.tx.send(Command::Schedule(script)).is_err() {
            tracing::warn!("autosave task is gone, dropping scheduled write");
        }
    }

    /// Write the pending value now, if there is one.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Flush and wait for the task to finish.
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "autosave task ended abnormally");
        }
    }
}

async fn run(
    store: Arc<dyn KvStore>,
    key: String,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<Script> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Schedule(script)) => {
                    pending = Some(script);
                    deadline = Some(Instant::now() + debounce);
                }
                Some(Command::Flush(ack)) => {
                    deadline = None;
                    write(store.as_ref(), &key, pending.take());
                    let _ = ack.send(());
                }
                None => {
                    write(store.as_ref(), &key, pending.take());
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                write(store.as_ref(), &key, pending.take());
            }
        }
    }
    tracing::debug!(key, "autosave task stopped");
}

fn write(store: &dyn KvStore, key: &str, script: Option<Script>) {
    let Some(script) = script else { return };
    if let Err(e) = save_script(store, key, &script) {
        tracing::warn!(key, error = %e, "autosave failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, STORAGE_KEY, StoreError, StoreResult, load_script};
    use manzai_types::ScriptUpdate;

    fn titled(base: &Script, title: &str) -> Script {
        base.apply(ScriptUpdate::new().title(title))
    }

    fn saved_title(store: &MemoryStore) -> Option<String> {
        load_script(store, STORAGE_KEY).unwrap().map(|s| s.title)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_write() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, Duration::from_millis(1000));
        let base = Script::new();

        for title in ["one", "two", "three"] {
            saver.schedule(titled(&base, title));
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(store.write_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(saved_title(&store).as_deref(), Some("three"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_write_separately() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, Duration::from_millis(500));
        let base = Script::new();

        saver.schedule(titled(&base, "first"));
        tokio::time::sleep(Duration::from_secs(1)).await;
        saver.schedule(titled(&base, "second"));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(store.write_count(), 2);
        assert_eq!(saved_title(&store).as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, Duration::from_secs(60));

        saver.schedule(titled(&Script::new(), "now"));
        saver.flush().await;
        assert_eq!(store.write_count(), 1);

        // Nothing left pending; the old deadline must not write again.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_with_nothing_pending_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, DEFAULT_DEBOUNCE);
        saver.flush().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_writes_pending() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, Duration::from_secs(60));
        saver.schedule(titled(&Script::new(), "last words"));
        saver.shutdown().await;
        assert_eq!(saved_title(&store).as_deref(), Some("last words"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_writes_pending() {
        let store = Arc::new(MemoryStore::new());
        let saver = Autosaver::spawn(store.clone(), STORAGE_KEY, Duration::from_secs(60));
        saver.schedule(titled(&Script::new(), "dropped"));
        drop(saver);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(saved_title(&store).as_deref(), Some("dropped"));
    }

    struct FailingStore;

    impl KvStore for FailingStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("quota exceeded")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failures_are_swallowed() {
        let saver = Autosaver::spawn(Arc::new(FailingStore), STORAGE_KEY, DEFAULT_DEBOUNCE);
        saver.schedule(Script::new());
        tokio::time::sleep(Duration::from_secs(2)).await;
        saver.schedule(Script::new());
        saver.shutdown().await;
    }
}
