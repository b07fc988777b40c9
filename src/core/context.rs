use std::path::PathBuf;
use tempfile::TempPath;
use crate::analysis::stopwords::StopWordSet;
use crate::core::config::IndexerConfig;
use crate::core::types::{FileIndex, FileRecord, MetaNameTable};

/// Everything one indexing run mutates, owned in one place and passed by
/// reference into the subsystems. Replaces any notion of process globals.
pub struct IndexerContext {
    pub config: IndexerConfig,
    /// Append-only global file list; `FileIndex` values point into it.
    pub files: Vec<FileRecord>,
    pub metas: MetaNameTable,
    pub stop_words: StopWordSet,

    /// Spilled partial-index segments awaiting the merge. The `TempPath`
    /// handles delete the files when the context drops, success or failure.
    pub partials: Vec<TempPath>,

    // Run counters. A rejected stop-word still counts as seen.
    pub total_words: u64,
    pub indexed_words: u64,
    pub spill_count: u32,
}

impl IndexerContext {
    pub fn new(config: IndexerConfig, stop_words: StopWordSet) -> Self {
        IndexerContext {
            config,
            files: Vec::new(),
            metas: MetaNameTable::new(),
            stop_words,
            partials: Vec::new(),
            total_words: 0,
            indexed_words: 0,
            spill_count: 0,
        }
    }

    /// Register a file under the next dense index.
    pub fn add_file(&mut self, path: PathBuf, size: u64, title: String) -> FileIndex {
        let index = FileIndex(self.files.len() as u32);
        self.files.push(FileRecord::new(index, path, size, title));
        index
    }

    pub fn file(&self, index: FileIndex) -> &FileRecord {
        &self.files[index.0 as usize]
    }

    pub fn file_mut(&mut self, index: FileIndex) -> &mut FileRecord {
        &mut self.files[index.0 as usize]
    }

    pub fn file_count(&self) -> u32 {
        self.files.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_indices_are_dense_and_ordered() {
        let mut ctx = IndexerContext::new(IndexerConfig::default(), StopWordSet::empty());
        let a = ctx.add_file(PathBuf::from("a.txt"), 10, "a.txt".into());
        let b = ctx.add_file(PathBuf::from("b.txt"), 20, "b.txt".into());
        assert_eq!(a, FileIndex(0));
        assert_eq!(b, FileIndex(1));
        assert_eq!(ctx.file(b).size, 20);
    }
}
