use std::time::Duration;

use tracing::{debug, warn};

use crate::data::wire::{TaskRequest, TaskResponse, TransferAction};
use crate::data::Backend;
use crate::debounce::Debouncer;
use crate::error::ClientError;
use crate::executor::TaskExecutor;
use crate::model::collection::FileCollection;
use crate::model::entry::FileEntry;
use crate::model::sort::{self, SortSpec};

/// Quiescence window for free-text filter updates.
pub const SEARCH_DEBOUNCE_MS: u64 = 200;

/// Which collection is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Normal,
    RecursiveSearch,
}

/// Downloaded bytes together with the name the UI should save them under.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Canonical client-side state for one directory session.
///
/// Owns the cached collections, the selection, the filter and sort state,
/// and a task executor; every user action dispatches exactly one task and
/// folds its outcome back in with a per-operation merge rule. A failed
/// mutating action leaves local state exactly as it was and propagates the
/// error; failed reads keep the stale-but-valid view.
pub struct FileStore<B: Backend> {
    executor: TaskExecutor,
    backend: B,
    current_dir: String,
    files: FileCollection,
    search_results: FileCollection,
    search_mode: SearchMode,
    selection: Vec<String>,
    search_text: String,
    sort: SortSpec,
    loading: bool,
    search_debounce: Debouncer<String>,
}

impl<B: Backend> FileStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_debounce_window(backend, Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn with_debounce_window(backend: B, window: Duration) -> Self {
        FileStore {
            executor: TaskExecutor::new(),
            backend,
            current_dir: String::new(),
            files: FileCollection::new(),
            search_results: FileCollection::new(),
            search_mode: SearchMode::Normal,
            selection: Vec::new(),
            search_text: String::new(),
            sort: SortSpec::default(),
            loading: false,
            search_debounce: Debouncer::new(window),
        }
    }

    /// Dispatch one task and block until its terminal outcome. The round
    /// trip itself runs on the worker's own thread.
    fn dispatch(&self, request: TaskRequest) -> Result<TaskResponse, ClientError> {
        let operation = request.operation();
        let worker = self.backend.worker(request);
        self.executor.execute(operation, worker).wait()
    }

    /// Replace the directory collection with a fresh listing. On success the
    /// selection is cleared and the view drops back to Normal mode; on
    /// failure the prior snapshot stays visible.
    pub fn list(&mut self, dir: &str) -> Result<(), ClientError> {
        self.loading = true;
        let outcome = self.dispatch(TaskRequest::ListDirectory {
            dir: dir.to_string(),
        });
        self.loading = false;
        match outcome {
            Ok(TaskResponse::Listing(entries)) => {
                debug!(dir, entries = entries.len(), "directory listed");
                self.files = FileCollection::from_listing(entries);
                self.selection.clear();
                self.current_dir = dir.to_string();
                self.search_mode = SearchMode::Normal;
                Ok(())
            }
            Ok(_) => Err(unexpected_payload("listDirectory")),
            Err(err) => {
                warn!(dir, %err, "listing failed");
                Err(err)
            }
        }
    }

    /// Re-issue the listing for the current directory.
    pub fn refresh(&mut self) -> Result<(), ClientError> {
        let dir = self.current_dir.clone();
        self.list(&dir)
    }

    /// Fetch a file's raw content. Directories and the parent shortcut yield
    /// `None` without a round trip. The collection is not touched.
    pub fn content(&self, entry: &FileEntry) -> Result<Option<String>, ClientError> {
        if entry.is_parent_link() || entry.is_dir() {
            return Ok(None);
        }
        let request = TaskRequest::GetContent {
            dir: self.target_dir(entry),
            filename: entry.name.clone(),
        };
        match self.dispatch(request)? {
            TaskResponse::Content(text) => Ok(Some(text)),
            _ => Err(unexpected_payload("getContent")),
        }
    }

    /// Create a file in the current directory. The returned entry (possibly
    /// server-normalized) is prepended to the display order.
    pub fn create_file(
        &mut self,
        filename: &str,
        content: &str,
        override_existing: bool,
    ) -> Result<(), ClientError> {
        let request = TaskRequest::CreateFile {
            dir: self.current_dir.clone(),
            filename: filename.to_string(),
            content: content.to_string(),
            override_existing,
        };
        match self.dispatch(request)? {
            TaskResponse::Entry(entry) => {
                debug!(name = %entry.name, "file created");
                self.files.insert_front(entry);
                Ok(())
            }
            _ => Err(unexpected_payload("createFile")),
        }
    }

    /// Create a directory in the current directory, prepended like a file.
    pub fn create_directory(&mut self, dirname: &str) -> Result<(), ClientError> {
        let request = TaskRequest::CreateDirectory {
            dir: self.current_dir.clone(),
            dirname: dirname.to_string(),
        };
        match self.dispatch(request)? {
            TaskResponse::Entry(entry) => {
                debug!(name = %entry.name, "directory created");
                self.files.insert_front(entry);
                Ok(())
            }
            _ => Err(unexpected_payload("createDirectory")),
        }
    }

    /// Edit a file, possibly renaming it. The server reply is folded into
    /// the active collection with the tri-way merge rule: content-only edits
    /// keep their position, renames surface at the front.
    pub fn edit_file(
        &mut self,
        filename: &str,
        new_name: &str,
        content: &str,
        override_existing: bool,
    ) -> Result<(), ClientError> {
        let request = TaskRequest::EditFile {
            dir: self.current_dir.clone(),
            filename: filename.to_string(),
            new_name: new_name.to_string(),
            content: content.to_string(),
            override_existing,
        };
        match self.dispatch(request)? {
            TaskResponse::Entry(entry) => {
                debug!(from = filename, to = %entry.name, "file edited");
                self.active_mut().merge_edited(filename, entry);
                Ok(())
            }
            _ => Err(unexpected_payload("editFile")),
        }
    }

    /// Copy or move the current selection to `destination`. A move removes
    /// the selected keys from the active collection; a copy leaves them in
    /// place. Either way the selection is cleared on success only.
    pub fn move_or_copy(
        &mut self,
        destination: &str,
        action: TransferAction,
    ) -> Result<(), ClientError> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let request = TaskRequest::CopyMove {
            dir: self.current_dir.clone(),
            filenames: self.selection.clone(),
            destination: destination.to_string(),
            action,
        };
        match self.dispatch(request)? {
            TaskResponse::Ack => {
                debug!(
                    destination,
                    action = action.as_str(),
                    count = self.selection.len(),
                    "transfer complete"
                );
                if action == TransferAction::Move {
                    let moved = std::mem::take(&mut self.selection);
                    for name in &moved {
                        self.active_mut().remove(name);
                    }
                } else {
                    self.selection.clear();
                }
                Ok(())
            }
            _ => Err(unexpected_payload("copyMove")),
        }
    }

    /// Run a server-side recursive search from the current directory. On
    /// success the search collection is replaced wholesale and becomes the
    /// displayed one; the directory collection is untouched.
    pub fn search(&mut self, pattern: &str) -> Result<(), ClientError> {
        self.loading = true;
        let outcome = self.dispatch(TaskRequest::Search {
            dir: self.current_dir.clone(),
            pattern: pattern.to_string(),
        });
        self.loading = false;
        match outcome {
            Ok(TaskResponse::Listing(entries)) => {
                debug!(pattern, matches = entries.len(), "recursive search done");
                self.search_results = FileCollection::from_listing(entries);
                self.search_mode = SearchMode::RecursiveSearch;
                self.selection.clear();
                Ok(())
            }
            Ok(_) => Err(unexpected_payload("search")),
            Err(err) => {
                warn!(pattern, %err, "recursive search failed");
                Err(err)
            }
        }
    }

    /// Drop the search result set and return to the directory view.
    pub fn close_search(&mut self) {
        if self.search_mode == SearchMode::RecursiveSearch {
            self.search_results.clear();
            self.selection.clear();
            self.search_mode = SearchMode::Normal;
        }
    }

    /// Download a file, or a directory as a zip archive. Entries carrying an
    /// explicit path (search results) are targeted where they live rather
    /// than in the current directory. The parent shortcut yields `None`.
    pub fn download(&self, entry: &FileEntry) -> Result<Option<DownloadedFile>, ClientError> {
        if entry.is_parent_link() {
            return Ok(None);
        }
        let archive = entry.is_dir();
        let request = TaskRequest::Download {
            dir: self.target_dir(entry),
            filename: entry.name.clone(),
            archive,
        };
        match self.dispatch(request)? {
            TaskResponse::Binary(bytes) => {
                let filename = if archive {
                    format!("{}.zip", entry.name)
                } else {
                    entry.name.clone()
                };
                debug!(name = %filename, bytes = bytes.len(), "download complete");
                Ok(Some(DownloadedFile {
                    filename,
                    mime_type: entry.mime_type.clone(),
                    bytes,
                }))
            }
            _ => Err(unexpected_payload("download")),
        }
    }

    /// Toggle an entry in or out of the selection, keeping toggle order.
    /// Names not present in the active collection are ignored.
    pub fn toggle_selected(&mut self, name: &str) {
        if !self.active().contains(name) {
            return;
        }
        if let Some(pos) = self.selection.iter().position(|n| n == name) {
            self.selection.remove(pos);
        } else {
            self.selection.push(name.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.iter().any(|n| n == name)
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Apply a free-text filter update immediately.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Queue a filter update through the debouncer; it takes effect via
    /// `apply_pending_search_text` once typing goes quiet.
    pub fn queue_search_text(&self, text: impl Into<String>) {
        self.search_debounce.push(text.into());
    }

    /// Fold any settled filter update into the store. Returns whether the
    /// filter changed.
    pub fn apply_pending_search_text(&mut self) -> bool {
        match self.search_debounce.poll() {
            Some(text) => {
                let changed = text != self.search_text;
                self.search_text = text;
                changed
            }
            None => false,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// The collection currently on display.
    pub fn entries(&self) -> &FileCollection {
        self.active()
    }

    /// Filtered and sorted view of the active collection: a pure function of
    /// the collection, the filter text and the sort spec.
    pub fn visible_entries(&self) -> Vec<&FileEntry> {
        sort::visible_entries(self.active(), &self.search_text, self.sort)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    fn active(&self) -> &FileCollection {
        match self.search_mode {
            SearchMode::Normal => &self.files,
            SearchMode::RecursiveSearch => &self.search_results,
        }
    }

    fn active_mut(&mut self) -> &mut FileCollection {
        match self.search_mode {
            SearchMode::Normal => &mut self.files,
            SearchMode::RecursiveSearch => &mut self.search_results,
        }
    }

    fn target_dir(&self, entry: &FileEntry) -> String {
        entry
            .parent_dir()
            .unwrap_or_else(|| self.current_dir.clone())
    }
}

fn unexpected_payload(operation: &str) -> ClientError {
    ClientError::Worker(format!("unexpected payload shape for {operation}"))
}
