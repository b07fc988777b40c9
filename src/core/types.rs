use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Position of a file in the global file list, assigned in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileIndex(pub u32);

impl FileIndex {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for FileIndex {
    fn from(id: u32) -> Self {
        FileIndex(id)
    }
}

/// Dense identifier for a meta-name (HTML META name, mail header, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetaId(pub u32);

impl MetaId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// One indexed file. Created when the file is first opened; immutable
/// afterwards except for the running word-count tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub index: FileIndex,
    pub path: PathBuf,
    pub size: u64,
    pub title: String,
    /// Total words seen in this file, the ranking denominator.
    pub word_count: u32,
}

impl FileRecord {
    pub fn new(index: FileIndex, path: PathBuf, size: u64, title: String) -> Self {
        FileRecord {
            index,
            path,
            size,
            title,
            word_count: 0,
        }
    }
}

/// One word's presence in one file.
///
/// Created on the word's first occurrence in the file; later occurrences in
/// the same file bump `count` and may add meta ids. `rank` stays 0 until
/// filled in exactly once, at finalize time or during the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOccurrence {
    pub file: FileIndex,
    /// Meta-name ids this occurrence is tagged with, ascending, no dupes.
    pub metas: Vec<MetaId>,
    /// Occurrences of the word within this file.
    pub count: u32,
    pub rank: u32,
}

impl FileOccurrence {
    pub fn new(file: FileIndex) -> Self {
        FileOccurrence {
            file,
            metas: Vec::new(),
            count: 0,
            rank: 0,
        }
    }

    pub fn add_meta(&mut self, meta: MetaId) {
        if let Err(pos) = self.metas.binary_search(&meta) {
            self.metas.insert(pos, meta);
        }
    }
}

/// Meta-name → dense id table, insertion-ordered, case-normalized.
/// Ids are never renumbered once assigned.
#[derive(Debug, Default)]
pub struct MetaNameTable {
    pub names: Vec<String>,
    pub by_name: HashMap<String, MetaId>,
}

impl MetaNameTable {
    pub fn new() -> Self {
        MetaNameTable::default()
    }

    /// Look up a name, assigning the next id on first sight.
    pub fn intern(&mut self, name: &str) -> MetaId {
        let key = name.to_lowercase();
        if let Some(&id) = self.by_name.get(&key) {
            return id;
        }
        let id = MetaId(self.names.len() as u32);
        self.names.push(key.clone());
        self.by_name.insert(key, id);
        id
    }

    pub fn get(&self, name: &str) -> Option<MetaId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn name_of(&self, id: MetaId) -> Option<&str> {
        self.names.get(id.0 as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_table_interns_case_insensitively() {
        let mut table = MetaNameTable::new();
        let a = table.intern("Author");
        let b = table.intern("author");
        let c = table.intern("keywords");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.name_of(a), Some("author"));
        assert_eq!(table.len(), 2);
    }
}
