use std::collections::HashMap;
use crate::core::types::{FileIndex, FileOccurrence, MetaId};

/// One word's accumulation state for the current batch.
#[derive(Debug, Clone, Default)]
pub struct WordEntry {
    /// Total occurrences across all files seen so far in this batch.
    pub total: u32,
    /// One record per file, ordered by first occurrence. Files are handed
    /// to the index in discovery order, so this is also ascending by file
    /// index, which the codec and the merge both require.
    pub occurrences: Vec<FileOccurrence>,
}

/// Accumulation target while indexing a batch of files.
///
/// Sorted on flush, not on insert; `drain_sorted` hands the contents over
/// in the on-disk word order and clears the map.
#[derive(Debug, Default)]
pub struct InMemoryWordIndex {
    words: HashMap<String, WordEntry>,
}

impl InMemoryWordIndex {
    pub fn new() -> Self {
        InMemoryWordIndex::default()
    }

    /// Insert-or-update one occurrence. A word never holds two records for
    /// the same file; repeats within a file bump the existing record.
    pub fn record(&mut self, word: &str, file: FileIndex, meta: Option<MetaId>) {
        let entry = self.words.entry(word.to_string()).or_default();
        entry.total += 1;

        // Files are processed one at a time, so a repeat can only be the
        // most recent record.
        match entry.occurrences.last_mut() {
            Some(occ) if occ.file == file => {
                occ.count += 1;
                if let Some(meta) = meta {
                    occ.add_meta(meta);
                }
            }
            _ => {
                debug_assert!(
                    entry.occurrences.last().is_none_or(|occ| occ.file < file),
                    "file indices must arrive in ascending order"
                );
                let mut occ = FileOccurrence::new(file);
                occ.count = 1;
                if let Some(meta) = meta {
                    occ.add_meta(meta);
                }
                entry.occurrences.push(occ);
            }
        }
    }

    /// Distinct words currently held, the spill-threshold measure.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drain the map into word-sorted order, leaving it empty.
    pub fn drain_sorted(&mut self) -> Vec<(String, WordEntry)> {
        let mut entries: Vec<(String, WordEntry)> = self.words.drain().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
