//! Client engine for a remote file-management service: dispatches filesystem
//! operations to isolated worker threads and keeps a locally cached, orderable,
//! filterable view of the current directory consistent with server replies.

pub mod data;
pub mod debounce;
pub mod error;
pub mod executor;
pub mod model;
pub mod store;

pub use data::http::{HttpBackend, HttpWorker};
pub use data::wire::{TaskRequest, TaskResponse, TransferAction};
pub use data::Backend;
pub use debounce::Debouncer;
pub use error::ClientError;
pub use executor::{TaskExecutor, TaskHandle, TaskId, TaskStatus, TaskWorker};
pub use model::collection::FileCollection;
pub use model::entry::{EntryKind, FileEntry, PARENT_LINK};
pub use model::sort::{SortKey, SortSpec};
pub use store::{DownloadedFile, FileStore, SearchMode};
