use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};
use crate::codec::entry::{OccurrenceIter, encode_word_entry};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::FileOccurrence;
use crate::index::memory::WordEntry;

/// Spill the in-memory index to a partial-index temp file.
///
/// A partial index is the word segment alone, in the regular word-entry
/// encoding, prefixed by an entry count. Global ranks are not knowable yet,
/// so the rank slot carries the per-file occurrence count instead.
pub struct PartialIndexWriter;

impl PartialIndexWriter {
    /// Write `entries` (already word-sorted) and hand back the temp path.
    /// The path deletes its file on drop, which is the exit-time cleanup
    /// for both success and failure.
    pub fn write(entries: &[(String, WordEntry)]) -> Result<TempPath> {
        let file = NamedTempFile::new().map_err(|e| {
            Error::new(
                ErrorKind::Io,
                format!("cannot create partial index: {e}"),
            )
        })?;
        let mut out = BufWriter::new(file);

        out.write_all(&(entries.len() as u32).to_ne_bytes())?;
        let mut buf = Vec::new();
        for (word, entry) in entries {
            buf.clear();
            let occurrences: Vec<FileOccurrence> = entry
                .occurrences
                .iter()
                .map(|occ| FileOccurrence {
                    rank: occ.count,
                    ..occ.clone()
                })
                .collect();
            encode_word_entry(&mut buf, word, &occurrences);
            out.write_all(&buf)?;
        }

        let file = out
            .into_inner()
            .map_err(|e| Error::new(ErrorKind::Io, format!("partial index flush: {e}")))?;
        file.as_file().sync_all()?;
        Ok(file.into_temp_path())
    }
}

/// Sequential reader over one partial index, one word entry at a time.
#[derive(Debug)]
pub struct PartialIndexCursor {
    input: BufReader<File>,
    remaining: u32,
}

impl PartialIndexCursor {
    /// Reopen a spilled segment. Failure here is fatal to the merge and
    /// carries its own exit code.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::new(
                ErrorKind::PartialIndex,
                format!("cannot reopen partial index {}: {}", path.display(), e),
            )
        })?;
        let mut input = BufReader::new(file);

        let mut count = [0u8; 4];
        input.read_exact(&mut count).map_err(|e| {
            Error::new(
                ErrorKind::PartialIndex,
                format!("partial index {} truncated: {}", path.display(), e),
            )
        })?;

        Ok(PartialIndexCursor {
            input,
            remaining: u32::from_ne_bytes(count),
        })
    }

    /// Next word entry, or `None` once exhausted.
    pub fn next_entry(&mut self) -> Result<Option<(String, Vec<FileOccurrence>)>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let mut word = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            self.input.read_exact(&mut byte)?;
            if byte[0] == 0 {
                break;
            }
            word.push(byte[0]);
        }
        let word = String::from_utf8(word)
            .map_err(|_| Error::new(ErrorKind::Corrupt, "partial index word is not UTF-8".to_string()))?;

        // Occurrence data is self-terminating but arrives off a stream, so
        // buffer it entry by entry through the shared decoder.
        let mut data = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            self.input.read_exact(&mut byte)?;
            data.push(byte[0]);
            if byte[0] == crate::codec::varint::ENTRY_END {
                break;
            }
        }
        let occurrences: Result<Vec<FileOccurrence>> = OccurrenceIter::new(&data).collect();
        Ok(Some((word, occurrences?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FileIndex, MetaId};
    use crate::index::memory::InMemoryWordIndex;

    #[test]
    fn spill_and_read_back_preserves_entries() {
        let mut index = InMemoryWordIndex::new();
        index.record("beta", FileIndex(0), None);
        index.record("beta", FileIndex(0), None);
        index.record("alpha", FileIndex(1), Some(MetaId(0)));

        let entries = index.drain_sorted();
        let path = PartialIndexWriter::write(&entries).unwrap();

        let mut cursor = PartialIndexCursor::open(&path).unwrap();
        let (word, occs) = cursor.next_entry().unwrap().unwrap();
        assert_eq!(word, "alpha");
        assert_eq!(occs[0].metas, vec![MetaId(0)]);
        assert_eq!(occs[0].rank, occs[0].count); // count mirrored into rank slot

        let (word, occs) = cursor.next_entry().unwrap().unwrap();
        assert_eq!(word, "beta");
        assert_eq!(occs[0].count, 2);
        assert_eq!(occs[0].rank, 2);

        assert!(cursor.next_entry().unwrap().is_none());
    }

    #[test]
    fn reopening_a_missing_partial_is_a_distinct_error() {
        let err = PartialIndexCursor::open(Path::new("/no/such/partial")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PartialIndex);
    }
}
