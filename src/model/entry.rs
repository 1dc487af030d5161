use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the synthetic parent-directory shortcut in a listing.
pub const PARENT_LINK: &str = "..";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

/// One file or directory record in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Unique key within its collection.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Byte count. Comparisons always use this, never the display string.
    #[serde(default, rename = "size_raw")]
    pub size: u64,
    /// Human-readable size as the server formatted it.
    #[serde(default, rename = "size")]
    pub size_display: String,
    /// Location for operations that target an entry outside the currently
    /// open directory (recursive search results carry this).
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_parent_link(&self) -> bool {
        self.name == PARENT_LINK
    }

    /// Directory the entry lives in, when it carries an explicit path.
    /// A trailing `/<name>` component is stripped; otherwise the path is
    /// already the containing directory.
    pub fn parent_dir(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        let trimmed = path.trim_end_matches('/');
        match trimmed.rsplit_once('/') {
            Some((dir, leaf)) if leaf == self.name => Some(dir.to_string()),
            _ if trimmed == self.name => Some(String::new()),
            _ => Some(trimmed.to_string()),
        }
    }

    /// Backfill the display size when the server omits it.
    pub fn normalized(mut self) -> Self {
        if self.size_display.is_empty() {
            self.size_display = format_size(self.size);
        }
        self
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, path: Option<&str>) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            kind: EntryKind::File,
            size: 0,
            size_display: String::new(),
            path: path.map(String::from),
            mime_type: None,
            modified_at: None,
        }
    }

    #[test]
    fn parent_dir_strips_leaf_component() {
        let e = entry("notes.txt", Some("docs/archive/notes.txt"));
        assert_eq!(e.parent_dir().as_deref(), Some("docs/archive"));
    }

    #[test]
    fn parent_dir_keeps_bare_directory_path() {
        let e = entry("notes.txt", Some("docs/archive"));
        assert_eq!(e.parent_dir().as_deref(), Some("docs/archive"));
    }

    #[test]
    fn parent_dir_of_root_level_path_is_empty() {
        let e = entry("notes.txt", Some("notes.txt"));
        assert_eq!(e.parent_dir().as_deref(), Some(""));
    }

    #[test]
    fn parent_dir_absent_without_path() {
        assert_eq!(entry("notes.txt", None).parent_dir(), None);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn normalized_backfills_display_size() {
        let e = FileEntry {
            size: 2048,
            ..entry("a.bin", None)
        };
        assert_eq!(e.normalized().size_display, "2.0 KB");
    }

    #[test]
    fn deserializes_wire_record() {
        let e: FileEntry = serde_json::from_str(
            r#"{"name":"report.pdf","type":"file","size":"1.0 KB","size_raw":1024,"mime_type":"application/pdf"}"#,
        )
        .unwrap();
        assert_eq!(e.name, "report.pdf");
        assert_eq!(e.kind, EntryKind::File);
        assert_eq!(e.size, 1024);
        assert_eq!(e.size_display, "1.0 KB");
        assert_eq!(e.mime_type.as_deref(), Some("application/pdf"));
        assert!(e.modified_at.is_none());
    }
}
