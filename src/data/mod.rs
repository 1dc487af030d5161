pub mod http;
pub mod wire;

use crate::data::wire::{TaskRequest, TaskResponse};
use crate::executor::TaskWorker;

/// Source of workers for dispatched operations. `HttpBackend` is the
/// production implementation; tests substitute an in-process stub.
pub trait Backend {
    type Worker: TaskWorker<Output = TaskResponse>;

    fn worker(&self, request: TaskRequest) -> Self::Worker;
}
