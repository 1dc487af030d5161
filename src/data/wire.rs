use serde::Deserialize;

use crate::error::ClientError;
use crate::model::entry::FileEntry;

/// Copy vs move for `copyMove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    Copy,
    Move,
}

impl TransferAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferAction::Copy => "copy",
            TransferAction::Move => "move",
        }
    }
}

/// One dispatched operation with its payload. The backend discriminates on
/// the `api` form field plus a flat parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskRequest {
    ListDirectory {
        dir: String,
    },
    GetContent {
        dir: String,
        filename: String,
    },
    CreateFile {
        dir: String,
        filename: String,
        content: String,
        override_existing: bool,
    },
    EditFile {
        dir: String,
        filename: String,
        new_name: String,
        content: String,
        override_existing: bool,
    },
    CreateDirectory {
        dir: String,
        dirname: String,
    },
    CopyMove {
        dir: String,
        filenames: Vec<String>,
        destination: String,
        action: TransferAction,
    },
    Search {
        dir: String,
        pattern: String,
    },
    Download {
        dir: String,
        filename: String,
        archive: bool,
    },
}

impl TaskRequest {
    /// Wire identifier of the operation.
    pub fn operation(&self) -> &'static str {
        match self {
            TaskRequest::ListDirectory { .. } => "listDirectory",
            TaskRequest::GetContent { .. } => "getContent",
            TaskRequest::CreateFile { .. } => "createFile",
            TaskRequest::EditFile { .. } => "editFile",
            TaskRequest::CreateDirectory { .. } => "createDirectory",
            TaskRequest::CopyMove { .. } => "copyMove",
            TaskRequest::Search { .. } => "search",
            TaskRequest::Download { archive: false, .. } => "download",
            TaskRequest::Download { archive: true, .. } => "zipAndDownload",
        }
    }

    /// True when the success payload is raw bytes rather than JSON.
    pub fn expects_binary(&self) -> bool {
        matches!(self, TaskRequest::Download { .. })
    }

    /// Flat POST form for the request. Repeated values use the `[]` key
    /// suffix; an unchanged name is sent as an empty `newname`.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![param("api", self.operation())];
        match self {
            TaskRequest::ListDirectory { dir } => {
                params.push(param("dir", dir));
            }
            TaskRequest::GetContent { dir, filename } => {
                params.push(param("dir", dir));
                params.push(param("filename", filename));
            }
            TaskRequest::CreateFile {
                dir,
                filename,
                content,
                override_existing,
            } => {
                params.push(param("dir", dir));
                params.push(param("filename", filename));
                params.push(param("content", content));
                params.push(flag("override", *override_existing));
            }
            TaskRequest::EditFile {
                dir,
                filename,
                new_name,
                content,
                override_existing,
            } => {
                params.push(param("dir", dir));
                params.push(param("filename", filename));
                let newname = if new_name == filename { "" } else { new_name };
                params.push(param("newname", newname));
                params.push(param("content", content));
                params.push(flag("override", *override_existing));
            }
            TaskRequest::CreateDirectory { dir, dirname } => {
                params.push(param("dir", dir));
                params.push(param("dirname", dirname));
            }
            TaskRequest::CopyMove {
                dir,
                filenames,
                destination,
                action,
            } => {
                params.push(param("dir", dir));
                params.push(param("destination", destination));
                params.push(param("action", action.as_str()));
                for name in filenames {
                    params.push(param("filenames[]", name));
                }
            }
            TaskRequest::Search { dir, pattern } => {
                params.push(param("dir", dir));
                params.push(param("pattern", pattern));
            }
            TaskRequest::Download { dir, filename, .. } => {
                params.push(param("dir", dir));
                params.push(param("filename", filename));
            }
        }
        params
    }
}

fn param(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn flag(key: &str, value: bool) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Parsed success payload of one round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResponse {
    Listing(Vec<FileEntry>),
    Content(String),
    Entry(FileEntry),
    Ack,
    Binary(Vec<u8>),
}

/// `{status, ...}` envelope shared by the JSON-returning operations.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "fileData")]
    file_data: Option<FileEntry>,
    #[serde(default)]
    data: Option<ContentData>,
}

#[derive(Debug, Deserialize)]
struct ContentData {
    content: String,
}

/// Decode a 2xx transport body for `request` into a typed response. The
/// transport status has already been checked; only the application-level
/// `status` field can still reject here.
pub fn parse_response(request: &TaskRequest, body: &[u8]) -> Result<TaskResponse, ClientError> {
    match request {
        TaskRequest::ListDirectory { .. } | TaskRequest::Search { .. } => {
            let listing: Vec<FileEntry> = decode(body)?;
            Ok(TaskResponse::Listing(
                listing.into_iter().map(FileEntry::normalized).collect(),
            ))
        }
        TaskRequest::GetContent { .. } => {
            let envelope: StatusEnvelope = decode(body)?;
            ensure_ok(&envelope)?;
            match envelope.data {
                Some(data) => Ok(TaskResponse::Content(data.content)),
                None => Err(ClientError::Application(
                    "response carried no content".to_string(),
                )),
            }
        }
        TaskRequest::CreateFile { .. }
        | TaskRequest::EditFile { .. }
        | TaskRequest::CreateDirectory { .. } => {
            let envelope: StatusEnvelope = decode(body)?;
            ensure_ok(&envelope)?;
            match envelope.file_data {
                Some(entry) => Ok(TaskResponse::Entry(entry.normalized())),
                None => Err(ClientError::Application(
                    "response carried no fileData".to_string(),
                )),
            }
        }
        TaskRequest::CopyMove { .. } => {
            let envelope: StatusEnvelope = decode(body)?;
            ensure_ok(&envelope)?;
            Ok(TaskResponse::Ack)
        }
        TaskRequest::Download { .. } => Ok(TaskResponse::Binary(body.to_vec())),
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body)
        .map_err(|err| ClientError::Application(format!("malformed response: {err}")))
}

fn ensure_ok(envelope: &StatusEnvelope) -> Result<(), ClientError> {
    if envelope.status == "OK" {
        return Ok(());
    }
    Err(ClientError::Application(
        envelope
            .message
            .clone()
            .unwrap_or_else(|| format!("server reported status {}", envelope.status)),
    ))
}
