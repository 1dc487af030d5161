use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::error::ClientError;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
    Error,
    Aborted,
}

/// One unit of work: consumes its payload, performs exactly one round trip
/// against the backend, and returns the typed outcome. Runs on its own
/// thread; nothing crosses the boundary except the result message.
pub trait TaskWorker: Send + 'static {
    type Output: Send + 'static;

    fn run(self) -> Result<Self::Output, ClientError>;
}

struct TaskEntry {
    operation: String,
    status: TaskStatus,
    cancel: Arc<AtomicBool>,
}

/// Runs workers on isolated threads and tracks their lifecycle.
///
/// Each `execute` call backs exactly one worker; concurrent calls create
/// independent threads with no queueing or throttling. The registry keeps
/// terminal records so outcomes stay observable by id.
#[derive(Default)]
pub struct TaskExecutor {
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<TaskId, TaskEntry>>>,
}

impl TaskExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `worker` on a fresh thread and hand back a handle for the single
    /// terminal outcome. A worker panic is caught and surfaced as a
    /// `ClientError::Worker` rejection.
    pub fn execute<W: TaskWorker>(&self, operation: &str, worker: W) -> TaskHandle<W::Output> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        {
            let mut tasks = self.tasks.lock().unwrap();
            tasks.insert(
                id,
                TaskEntry {
                    operation: operation.to_string(),
                    status: TaskStatus::Pending,
                    cancel: Arc::clone(&cancel),
                },
            );
        }
        debug!(task = id, operation, "task dispatched");

        let (tx, rx) = mpsc::channel();
        let tasks = Arc::clone(&self.tasks);
        let op = operation.to_string();
        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.run()))
                .unwrap_or_else(|_| Err(ClientError::Worker(format!("{op} worker panicked"))));

            // A cancelled task's result is discarded, not delivered late.
            if cancel.load(Ordering::SeqCst) {
                debug!(task = id, "discarding result of cancelled task");
                return;
            }

            let status = if outcome.is_ok() {
                TaskStatus::Done
            } else {
                TaskStatus::Error
            };
            if let Ok(mut tasks) = tasks.lock() {
                if let Some(entry) = tasks.get_mut(&id) {
                    if entry.status == TaskStatus::Pending {
                        entry.status = status;
                    }
                }
            }
            if let Err(ref err) = outcome {
                warn!(task = id, operation = %op, %err, "task failed");
            }
            let _ = tx.send(outcome);
        });

        TaskHandle { id, rx }
    }

    /// Abort a pending task: mark it `Aborted` and discard whatever its
    /// worker eventually produces. The caller's pending wait is not resolved
    /// here; cancellation is cooperative and the caller is expected to drop
    /// the handle. Cancelling a terminal or unknown task is a no-op.
    pub fn cancel(&self, id: TaskId) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(entry) = tasks.get_mut(&id) {
            if entry.status == TaskStatus::Pending {
                entry.cancel.store(true, Ordering::SeqCst);
                entry.status = TaskStatus::Aborted;
                debug!(task = id, operation = %entry.operation, "task cancelled");
            }
        }
    }

    pub fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.tasks.lock().unwrap().get(&id).map(|e| e.status)
    }

    pub fn operation(&self, id: TaskId) -> Option<String> {
        self.tasks
            .lock()
            .unwrap()
            .get(&id)
            .map(|e| e.operation.clone())
    }
}

/// Caller side of one dispatched task.
pub struct TaskHandle<T> {
    id: TaskId,
    rx: mpsc::Receiver<Result<T, ClientError>>,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the task reaches a terminal outcome. If the task was
    /// cancelled out from under the caller, the discarded result surfaces as
    /// a worker fault.
    pub fn wait(self) -> Result<T, ClientError> {
        match self.rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Worker("task aborted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct StubWorker {
        outcome: Result<String, ClientError>,
        delay: Option<Duration>,
    }

    impl StubWorker {
        fn ok(value: &str) -> Self {
            StubWorker {
                outcome: Ok(value.to_string()),
                delay: None,
            }
        }

        fn err(err: ClientError) -> Self {
            StubWorker {
                outcome: Err(err),
                delay: None,
            }
        }
    }

    impl TaskWorker for StubWorker {
        type Output = String;

        fn run(self) -> Result<String, ClientError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            self.outcome
        }
    }

    struct PanickingWorker;

    impl TaskWorker for PanickingWorker {
        type Output = String;

        fn run(self) -> Result<String, ClientError> {
            panic!("boom");
        }
    }

    #[test]
    fn execute_resolves_with_worker_payload() {
        let executor = TaskExecutor::new();
        let handle = executor.execute("listDirectory", StubWorker::ok("payload"));
        let id = handle.id();
        assert_eq!(handle.wait().unwrap(), "payload");
        assert_eq!(executor.status(id), Some(TaskStatus::Done));
        assert_eq!(executor.operation(id).as_deref(), Some("listDirectory"));
    }

    #[test]
    fn execute_rejects_with_worker_error() {
        let executor = TaskExecutor::new();
        let handle = executor.execute(
            "createFile",
            StubWorker::err(ClientError::Transport("HTTP 500".to_string())),
        );
        let id = handle.id();
        assert_eq!(
            handle.wait(),
            Err(ClientError::Transport("HTTP 500".to_string()))
        );
        assert_eq!(executor.status(id), Some(TaskStatus::Error));
    }

    #[test]
    fn worker_panic_surfaces_as_worker_fault() {
        let executor = TaskExecutor::new();
        let handle = executor.execute("editFile", PanickingWorker);
        let id = handle.id();
        match handle.wait() {
            Err(ClientError::Worker(msg)) => assert!(msg.contains("editFile")),
            other => panic!("expected worker fault, got {:?}", other),
        }
        assert_eq!(executor.status(id), Some(TaskStatus::Error));
    }

    #[test]
    fn task_ids_are_unique_and_monotonic() {
        let executor = TaskExecutor::new();
        let a = executor.execute("listDirectory", StubWorker::ok("a"));
        let b = executor.execute("listDirectory", StubWorker::ok("b"));
        assert!(b.id() > a.id());
        a.wait().unwrap();
        b.wait().unwrap();
    }

    #[test]
    fn cancel_pending_task_discards_result() {
        let executor = TaskExecutor::new();
        let handle = executor.execute(
            "download",
            StubWorker {
                outcome: Ok("bytes".to_string()),
                delay: Some(Duration::from_millis(100)),
            },
        );
        let id = handle.id();
        executor.cancel(id);
        assert_eq!(executor.status(id), Some(TaskStatus::Aborted));
        // The discarded result surfaces as a fault, never as the payload.
        assert!(matches!(handle.wait(), Err(ClientError::Worker(_))));
        assert_eq!(executor.status(id), Some(TaskStatus::Aborted));
    }

    #[test]
    fn cancel_after_terminal_outcome_is_noop() {
        let executor = TaskExecutor::new();
        let handle = executor.execute("listDirectory", StubWorker::ok("payload"));
        let id = handle.id();
        handle.wait().unwrap();
        executor.cancel(id);
        assert_eq!(executor.status(id), Some(TaskStatus::Done));
    }

    #[test]
    fn cancel_unknown_task_is_noop() {
        let executor = TaskExecutor::new();
        executor.cancel(999);
        assert_eq!(executor.status(999), None);
    }

    #[test]
    fn concurrent_tasks_run_independently() {
        let executor = TaskExecutor::new();
        let slow = executor.execute(
            "listDirectory",
            StubWorker {
                outcome: Ok("slow".to_string()),
                delay: Some(Duration::from_millis(50)),
            },
        );
        let fast = executor.execute("listDirectory", StubWorker::ok("fast"));
        assert_eq!(fast.wait().unwrap(), "fast");
        assert_eq!(slow.wait().unwrap(), "slow");
    }
}
