use std::path::Path;
use crate::analysis::stopwords::StopWordSet;
use crate::codec::entry::{OccurrenceIter, scan_file_count};
use crate::codec::varint::Bcd;
use crate::codec::writer::SEGMENT_COUNT;
use crate::core::error::{Error, ErrorKind, Result};
use crate::mmap::MmapFile;

#[derive(Debug, Clone, Copy)]
struct SegmentHeader {
    count: u32,
    /// Byte position of this segment's offset array.
    table: usize,
}

/// One word entry, borrowed straight out of the mapped bytes.
pub struct WordEntryRef<'a> {
    pub word: &'a str,
    occ_data: &'a [u8],
}

impl<'a> WordEntryRef<'a> {
    /// Lazily decode the file-occurrence list.
    pub fn occurrences(&self) -> OccurrenceIter<'a> {
        OccurrenceIter::new(self.occ_data)
    }

    /// Number of files this word occurs in, via the fast linear scan.
    pub fn file_count(&self) -> Result<u32> {
        scan_file_count(self.occ_data).map(|(count, _)| count)
    }
}

/// A file record, decoded on demand from the file segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecordRef<'a> {
    pub path: &'a str,
    pub size: u32,
    pub word_count: u32,
    pub title: &'a str,
}

/// Read-only view of an index file through a memory mapping.
///
/// The header's offset tables make every segment a random-access sequence;
/// an "entry" is a pointer into the mapped bytes, decoded on demand. No
/// parse pass runs at open time beyond the four fixed headers.
pub struct IndexReader {
    map: MmapFile,
    headers: [SegmentHeader; SEGMENT_COUNT],
}

const WORDS: usize = 0;
const STOP_WORDS: usize = 1;
const FILES: usize = 2;
const META_NAMES: usize = 3;

fn read_u32(data: &[u8], pos: usize) -> Result<u32> {
    let bytes = data
        .get(pos..pos + 4)
        .ok_or_else(|| Error::new(ErrorKind::Corrupt, "index header truncated".to_string()))?;
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    Ok(u32::from_ne_bytes(word))
}

fn str_until_nul(data: &[u8]) -> Result<(&str, &[u8])> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::new(ErrorKind::Corrupt, "unterminated string".to_string()))?;
    let text = std::str::from_utf8(&data[..nul])
        .map_err(|_| Error::new(ErrorKind::Corrupt, "index string is not UTF-8".to_string()))?;
    Ok((text, &data[nul + 1..]))
}

impl IndexReader {
    pub fn open(path: &Path) -> Result<Self> {
        let map = MmapFile::open_read_only(path).map_err(|e| {
            Error::new(
                ErrorKind::Io,
                format!("cannot map index {}: {}", path.display(), e),
            )
        })?;

        let data = map.data();
        let mut headers = [SegmentHeader { count: 0, table: 0 }; SEGMENT_COUNT];
        let mut pos = 0usize;
        for header in headers.iter_mut() {
            let count = read_u32(data, pos)?;
            header.count = count;
            header.table = pos + 4;
            pos = pos + 4 + count as usize * 4;
        }
        if pos > data.len() {
            return Err(Error::new(
                ErrorKind::Corrupt,
                "index header runs past end of file".to_string(),
            ));
        }

        Ok(IndexReader { map, headers })
    }

    fn entry_bytes(&self, segment: usize, i: u32) -> Result<&[u8]> {
        let header = &self.headers[segment];
        if i >= header.count {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("entry {i} out of range for segment {segment}"),
            ));
        }
        let data = self.map.data();
        let offset = read_u32(data, header.table + i as usize * 4)? as usize;
        data.get(offset..)
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::Corrupt, "entry offset out of range".to_string()))
    }

    pub fn word_count(&self) -> u32 {
        self.headers[WORDS].count
    }

    pub fn stop_word_count(&self) -> u32 {
        self.headers[STOP_WORDS].count
    }

    pub fn file_count(&self) -> u32 {
        self.headers[FILES].count
    }

    pub fn meta_count(&self) -> u32 {
        self.headers[META_NAMES].count
    }

    pub fn word_entry(&self, i: u32) -> Result<WordEntryRef<'_>> {
        let bytes = self.entry_bytes(WORDS, i)?;
        let (word, rest) = str_until_nul(bytes)?;
        Ok(WordEntryRef {
            word,
            occ_data: rest,
        })
    }

    /// Binary search over the word offset table; words are stored in
    /// ascending byte order.
    pub fn find_word(&self, word: &str) -> Result<Option<WordEntryRef<'_>>> {
        let mut lo = 0u32;
        let mut hi = self.word_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.word_entry(mid)?;
            match entry.word.as_bytes().cmp(word.as_bytes()) {
                std::cmp::Ordering::Equal => return Ok(Some(entry)),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Ok(None)
    }

    pub fn stop_word(&self, i: u32) -> Result<&str> {
        let bytes = self.entry_bytes(STOP_WORDS, i)?;
        Ok(str_until_nul(bytes)?.0)
    }

    /// Binary search over the sorted stop-word segment.
    pub fn has_stop_word(&self, word: &str) -> Result<bool> {
        let mut lo = 0u32;
        let mut hi = self.stop_word_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.stop_word(mid)?.as_bytes().cmp(word.as_bytes()) {
                std::cmp::Ordering::Equal => return Ok(true),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Ok(false)
    }

    /// Rehydrate the stop segment, e.g. to seed an incremental run.
    pub fn stop_word_set(&self) -> Result<StopWordSet> {
        let mut set = StopWordSet::empty();
        for i in 0..self.stop_word_count() {
            set.insert(self.stop_word(i)?);
        }
        Ok(set)
    }

    pub fn file_record(&self, i: u32) -> Result<FileRecordRef<'_>> {
        let bytes = self.entry_bytes(FILES, i)?;
        let (path, rest) = str_until_nul(bytes)?;
        let (size, used, _) = Bcd::decode(rest)?;
        let rest = &rest[used..];
        let (word_count, used, _) = Bcd::decode(rest)?;
        let rest = &rest[used..];
        let (title, _) = str_until_nul(rest)?;
        Ok(FileRecordRef {
            path,
            size,
            word_count,
            title,
        })
    }

    pub fn meta_name(&self, i: u32) -> Result<&str> {
        let bytes = self.entry_bytes(META_NAMES, i)?;
        Ok(str_until_nul(bytes)?.0)
    }

    /// Meta names are insertion-ordered, so the lookup is a linear scan.
    pub fn find_meta(&self, name: &str) -> Result<Option<u32>> {
        let needle = name.to_lowercase();
        for i in 0..self.meta_count() {
            if self.meta_name(i)? == needle {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}
