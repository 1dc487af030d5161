use std::collections::HashMap;

use crate::model::entry::FileEntry;

/// Insertion-ordered cache of entries, uniquely keyed by name.
///
/// Holds exactly one directory snapshot or one recursive-search result set.
/// Display order is the insertion order; newly created or renamed entries are
/// pushed to the front so a fresh write is immediately visible at the top.
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    order: Vec<String>,
    entries: HashMap<String, FileEntry>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a server listing, preserving the server-given
    /// order. A duplicated name replaces the earlier record in place.
    pub fn from_listing(listing: Vec<FileEntry>) -> Self {
        let mut collection = Self::new();
        for entry in listing {
            if !collection.entries.contains_key(&entry.name) {
                collection.order.push(entry.name.clone());
            }
            collection.entries.insert(entry.name.clone(), entry);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.get(name)
    }

    /// Display position of an entry, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Insert an entry at the front of display order. An existing entry under
    /// the same name is overwritten and moved to the front.
    pub fn insert_front(&mut self, entry: FileEntry) {
        self.order.retain(|n| n != &entry.name);
        self.order.insert(0, entry.name.clone());
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<FileEntry> {
        self.order.retain(|n| n != name);
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    /// Fold the server's reply to an edit into the collection. Identity is
    /// tracked by name, so three cases fall out of the reply alone:
    ///
    /// - same name: a pure content edit; fields are replaced in place and the
    ///   entry keeps its display position.
    /// - new name, no existing entry under it: a rename; the old key is
    ///   removed and the entry appears at the front, like a fresh write.
    /// - new name that collides with an existing entry: the edit overwrote
    ///   that entry; the old key is removed, the target is overwritten and
    ///   moved to the front.
    pub fn merge_edited(&mut self, old_name: &str, entry: FileEntry) {
        if entry.name == old_name {
            match self.entries.get_mut(old_name) {
                Some(slot) => *slot = entry,
                None => self.insert_front(entry),
            }
            return;
        }
        self.remove(old_name);
        self.insert_front(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::EntryKind;

    fn file(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            kind: EntryKind::File,
            size: 1,
            size_display: "1 B".to_string(),
            path: None,
            mime_type: None,
            modified_at: None,
        }
    }

    fn names(c: &FileCollection) -> Vec<&str> {
        c.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn from_listing_preserves_server_order() {
        let c = FileCollection::from_listing(vec![file("b"), file("a"), file("c")]);
        assert_eq!(names(&c), ["b", "a", "c"]);
    }

    #[test]
    fn from_listing_deduplicates_by_name() {
        let mut dup = file("a");
        dup.size = 99;
        let c = FileCollection::from_listing(vec![file("a"), file("b"), dup]);
        assert_eq!(names(&c), ["a", "b"]);
        assert_eq!(c.get("a").unwrap().size, 99);
    }

    #[test]
    fn insert_front_prepends_new_entry() {
        let mut c = FileCollection::from_listing(vec![file("a"), file("b")]);
        c.insert_front(file("new"));
        assert_eq!(names(&c), ["new", "a", "b"]);
    }

    #[test]
    fn insert_front_moves_existing_entry() {
        let mut c = FileCollection::from_listing(vec![file("a"), file("b"), file("c")]);
        c.insert_front(file("c"));
        assert_eq!(names(&c), ["c", "a", "b"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn merge_content_edit_keeps_position() {
        let mut c = FileCollection::from_listing(vec![file("a.txt"), file("b.txt"), file("c.txt")]);
        let mut edited = file("b.txt");
        edited.size = 42;
        c.merge_edited("b.txt", edited);
        assert_eq!(names(&c), ["a.txt", "b.txt", "c.txt"]);
        assert_eq!(c.get("b.txt").unwrap().size, 42);
    }

    #[test]
    fn merge_rename_moves_to_front_and_drops_old_key() {
        let mut c = FileCollection::from_listing(vec![file("a.txt"), file("b.txt")]);
        c.merge_edited("a.txt", file("z.txt"));
        assert_eq!(names(&c), ["z.txt", "b.txt"]);
        assert!(!c.contains("a.txt"));
        assert_eq!(c.position("z.txt"), Some(0));
    }

    #[test]
    fn merge_rename_onto_existing_entry_overwrites_it() {
        let mut c = FileCollection::from_listing(vec![file("a.txt"), file("b.txt"), file("c.txt")]);
        let mut overwriting = file("c.txt");
        overwriting.size = 7;
        c.merge_edited("a.txt", overwriting);
        assert_eq!(names(&c), ["c.txt", "b.txt"]);
        assert!(!c.contains("a.txt"));
        assert_eq!(c.get("c.txt").unwrap().size, 7);
    }

    #[test]
    fn remove_drops_key_and_order_slot() {
        let mut c = FileCollection::from_listing(vec![file("a"), file("b")]);
        assert!(c.remove("a").is_some());
        assert_eq!(names(&c), ["b"]);
        assert!(c.remove("a").is_none());
    }
}
