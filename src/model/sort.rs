use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::collection::FileCollection;
use crate::model::entry::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Size,
    ModifiedAt,
    Type,
}

/// Secondary order applied within each partition; directories always come
/// before files regardless of key or direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            key: SortKey::Name,
            ascending: true,
        }
    }
}

/// Filter and order a collection for display: case-insensitive substring
/// match on name, directories-first partition, then `sort` within each
/// partition. Pure and deterministic; the sort is stable so ties keep their
/// insertion order.
pub fn visible_entries<'a>(
    collection: &'a FileCollection,
    search_text: &str,
    sort: SortSpec,
) -> Vec<&'a FileEntry> {
    let needle = search_text.to_lowercase();
    let mut out: Vec<&FileEntry> = collection
        .iter()
        .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
        .collect();
    out.sort_by(|a, b| {
        partition_rank(a).cmp(&partition_rank(b)).then_with(|| {
            let ord = compare_by_key(a, b, sort.key);
            if sort.ascending {
                ord
            } else {
                ord.reverse()
            }
        })
    });
    out
}

fn partition_rank(entry: &FileEntry) -> u8 {
    if entry.is_dir() {
        0
    } else {
        1
    }
}

fn compare_by_key(a: &FileEntry, b: &FileEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Size => a.size.cmp(&b.size),
        SortKey::ModifiedAt => a.modified_at.cmp(&b.modified_at),
        SortKey::Type => extension(&a.name)
            .cmp(&extension(&b.name))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
    }
}

fn extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}
