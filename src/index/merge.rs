use std::path::Path;
use crate::analysis::stopwords::StopWordSet;
use crate::codec::reader::IndexReader;
use crate::codec::writer::IndexFileWriter;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{FileOccurrence, FileRecord};
use crate::index::rank::RankEngine;
use crate::index::spill::PartialIndexCursor;

/// A word-sorted sequence of `(word, file-occurrence-data)` feeding the
/// merge: spilled partial indices, or the previous full index when a run
/// extends one incrementally.
pub trait MergeSource {
    fn next_entry(&mut self) -> Result<Option<(String, Vec<FileOccurrence>)>>;
}

impl MergeSource for PartialIndexCursor {
    fn next_entry(&mut self) -> Result<Option<(String, Vec<FileOccurrence>)>> {
        PartialIndexCursor::next_entry(self)
    }
}

/// Walks a prior index's word segment in stored (ascending) order.
pub struct PriorIndexCursor {
    reader: IndexReader,
    next: u32,
}

impl PriorIndexCursor {
    /// A missing or unreadable prior index makes the incremental run
    /// impossible and is fatal with its own exit code.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = IndexReader::open(path).map_err(|e| {
            Error::new(
                ErrorKind::PriorIndex,
                format!("cannot open prior index {}: {}", path.display(), e),
            )
        })?;
        Ok(PriorIndexCursor { reader, next: 0 })
    }

    /// The underlying reader, for preloading file/meta/stop segments.
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }
}

impl MergeSource for PriorIndexCursor {
    fn next_entry(&mut self) -> Result<Option<(String, Vec<FileOccurrence>)>> {
        if self.next >= self.reader.word_count() {
            return Ok(None);
        }
        let entry = self.reader.word_entry(self.next)?;
        self.next += 1;
        let occurrences: Result<Vec<FileOccurrence>> = entry.occurrences().collect();
        Ok(Some((entry.word.to_string(), occurrences?)))
    }
}

struct Cursor {
    source: Box<dyn MergeSource>,
    current: Option<(String, Vec<FileOccurrence>)>,
}

impl Cursor {
    fn advance(&mut self) -> Result<()> {
        self.current = self.source.next_entry()?;
        Ok(())
    }
}

/// n-way merge with re-ranking and stop-word promotion.
///
/// Ran as two passes over fresh cursors: a counting pre-pass so the word
/// segment's entry count can be written before any data (counts precede
/// offsets precede data), then the streaming write pass. Promotions made by
/// the pre-pass land in the stop set, so the write pass only has to test
/// membership; both passes combine occurrences identically.
pub struct Merger {
    pub rank: RankEngine,
}

impl Merger {
    pub fn new(rank: RankEngine) -> Self {
        Merger { rank }
    }

    fn cursors(sources: Vec<Box<dyn MergeSource>>) -> Result<Vec<Cursor>> {
        let mut cursors = Vec::with_capacity(sources.len());
        for source in sources {
            let mut cursor = Cursor {
                source,
                current: None,
            };
            cursor.advance()?;
            cursors.push(cursor);
        }
        Ok(cursors)
    }

    /// Smallest current word across all live cursors.
    fn min_word(cursors: &[Cursor]) -> Option<String> {
        cursors
            .iter()
            .filter_map(|c| c.current.as_ref().map(|(w, _)| w.as_str()))
            .min()
            .map(|w| w.to_string())
    }

    /// Combine the occurrence lists of every cursor positioned at `word`
    /// and advance those cursors. The result is ascending by file index; a
    /// file index reaching the merge from two sources means the inputs are
    /// inconsistent and is a hard error, never a silent sum.
    fn combine(cursors: &mut [Cursor], word: &str) -> Result<Vec<FileOccurrence>> {
        let mut combined: Vec<FileOccurrence> = Vec::new();
        for cursor in cursors.iter_mut() {
            match cursor.current.take() {
                Some((w, occurrences)) if w == word => {
                    combined.extend(occurrences);
                    cursor.advance()?;
                }
                other => cursor.current = other,
            }
        }

        combined.sort_by_key(|occ| occ.file);
        for pair in combined.windows(2) {
            if pair[0].file == pair[1].file {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    format!(
                        "word '{}' carries file index {} in two merge sources",
                        word, pair[0].file.0
                    ),
                ));
            }
        }
        Ok(combined)
    }

    /// Counting pre-pass: the number of unique words that will be emitted,
    /// net of stop words and too-frequent promotions (each such word is
    /// subtracted exactly once, however many sources carried it).
    /// Promotions are inserted into `stop_words` as a side effect.
    pub fn precount(
        &self,
        sources: Vec<Box<dyn MergeSource>>,
        stop_words: &mut StopWordSet,
        total_files: u32,
    ) -> Result<u32> {
        let mut cursors = Self::cursors(sources)?;
        let mut unique = 0u32;

        while let Some(word) = Self::min_word(&cursors) {
            let combined = Self::combine(&mut cursors, &word)?;
            if stop_words.contains(&word) {
                continue;
            }
            if self.rank.too_frequent(combined.len() as u32, total_files) {
                stop_words.insert(&word);
                continue;
            }
            unique += 1;
        }
        Ok(unique)
    }

    /// Streaming write pass: emit each surviving word with final ranks.
    /// The writer must have been created with the pre-pass's word count.
    pub fn write(
        &self,
        sources: Vec<Box<dyn MergeSource>>,
        stop_words: &StopWordSet,
        files: &[FileRecord],
        writer: &mut IndexFileWriter,
    ) -> Result<()> {
        let mut cursors = Self::cursors(sources)?;

        while let Some(word) = Self::min_word(&cursors) {
            let mut combined = Self::combine(&mut cursors, &word)?;
            if stop_words.contains(&word) {
                continue;
            }

            // The rank slot of unmerged data holds the per-file count.
            let total: u32 = combined.iter().map(|occ| occ.count).sum();
            for occ in combined.iter_mut() {
                let record = files.get(occ.file.0 as usize).ok_or_else(|| {
                    Error::new(
                        ErrorKind::Corrupt,
                        format!("file index {} has no file record", occ.file.0),
                    )
                })?;
                occ.rank = self.rank.rank(occ.count, total, record.word_count);
            }
            writer.write_word(&word, &combined)?;
        }
        Ok(())
    }
}
