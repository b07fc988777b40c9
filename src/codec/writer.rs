use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::warn;
use crate::codec::entry::encode_word_entry;
use crate::codec::varint::Bcd;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{FileOccurrence, FileRecord};

/// The four segment regions, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Words = 0,
    StopWords = 1,
    Files = 2,
    MetaNames = 3,
}

pub const SEGMENT_COUNT: usize = 4;

/// Streaming writer for the index file.
///
/// Layout: four `(count, offset[count])` headers in fixed segment order,
/// then the four data regions in the same order. Entry counts must be known
/// up front; the offset arrays are written as zeros and patched by a
/// seek-back once the variable-length data has been serialized, since the
/// offsets are not knowable earlier.
pub struct IndexFileWriter {
    file: BufWriter<File>,
    counts: [u32; SEGMENT_COUNT],
    offsets: [Vec<u32>; SEGMENT_COUNT],
    table_pos: [u64; SEGMENT_COUNT],
    pos: u64,
    current: usize,
}

impl IndexFileWriter {
    pub fn create(path: &Path, counts: [u32; SEGMENT_COUNT]) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            Error::new(
                ErrorKind::Io,
                format!("cannot create index {}: {}", path.display(), e),
            )
        })?;
        let mut file = BufWriter::new(file);

        let mut table_pos = [0u64; SEGMENT_COUNT];
        let mut pos = 0u64;
        for (i, &count) in counts.iter().enumerate() {
            file.write_all(&count.to_ne_bytes())?;
            pos += 4;
            table_pos[i] = pos;
            // Placeholder offsets, patched in finish().
            let zeros = vec![0u8; count as usize * 4];
            file.write_all(&zeros)?;
            pos += zeros.len() as u64;
        }

        Ok(IndexFileWriter {
            file,
            counts,
            offsets: Default::default(),
            table_pos,
            pos,
            current: 0,
        })
    }

    /// Write one entry's bytes into `segment`, recording its offset.
    /// Segments must be filled in on-disk order.
    pub fn entry(&mut self, segment: Segment, bytes: &[u8]) -> Result<()> {
        let seg = segment as usize;
        if seg < self.current {
            return Err(Error::new(
                ErrorKind::Internal,
                "index segments must be written in order".to_string(),
            ));
        }
        self.current = seg;

        if self.offsets[seg].len() as u32 >= self.counts[seg] {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("segment {segment:?} already holds its declared {} entries", self.counts[seg]),
            ));
        }
        if self.pos > u32::MAX as u64 {
            return Err(Error::new(ErrorKind::Io, "index exceeds 4 GiB".to_string()));
        }

        self.offsets[seg].push(self.pos as u32);
        self.file.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    pub fn write_word(&mut self, word: &str, occurrences: &[FileOccurrence]) -> Result<()> {
        let mut buf = Vec::with_capacity(word.len() + 2 + occurrences.len() * 8);
        encode_word_entry(&mut buf, word, occurrences);
        self.entry(Segment::Words, &buf)
    }

    pub fn write_stop_word(&mut self, word: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(word.len() + 1);
        buf.extend_from_slice(word.as_bytes());
        buf.push(0);
        self.entry(Segment::StopWords, &buf)
    }

    /// `path, NUL, size, word-count, title, NUL`.
    pub fn write_file(&mut self, record: &FileRecord) -> Result<()> {
        let size = match u32::try_from(record.size) {
            Ok(size) => size,
            Err(_) => {
                // The size field is a u32; a larger file still indexes, but
                // its stored size saturates.
                warn!(
                    path = %record.path.display(),
                    size = record.size,
                    "file size exceeds the index size field, storing the cap"
                );
                u32::MAX
            }
        };
        let mut buf = Vec::new();
        buf.extend_from_slice(record.path.to_string_lossy().as_bytes());
        buf.push(0);
        Bcd::encode(&mut buf, size);
        Bcd::encode(&mut buf, record.word_count);
        buf.extend_from_slice(record.title.as_bytes());
        buf.push(0);
        self.entry(Segment::Files, &buf)
    }

    pub fn write_meta(&mut self, name: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(name.len() + 1);
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
        self.entry(Segment::MetaNames, &buf)
    }

    /// Patch the offset tables and sync. Any declared-but-missing entry is
    /// an internal error; the file would be unreadable.
    pub fn finish(mut self) -> Result<()> {
        for seg in 0..SEGMENT_COUNT {
            if self.offsets[seg].len() as u32 != self.counts[seg] {
                return Err(Error::new(
                    ErrorKind::Internal,
                    format!(
                        "segment {seg} holds {} entries, {} declared",
                        self.offsets[seg].len(),
                        self.counts[seg]
                    ),
                ));
            }
        }

        self.file.flush()?;
        for seg in 0..SEGMENT_COUNT {
            self.file.seek(SeekFrom::Start(self.table_pos[seg]))?;
            for &offset in &self.offsets[seg] {
                self.file.write_all(&offset.to_ne_bytes())?;
            }
        }
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::codec::reader::IndexReader;
    use crate::core::types::FileIndex;

    #[test]
    fn oversized_file_size_saturates_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.idx");

        let mut writer = IndexFileWriter::create(&path, [0, 0, 1, 0]).unwrap();
        let record = FileRecord::new(
            FileIndex(0),
            PathBuf::from("huge.log"),
            u32::MAX as u64 + 1,
            "huge.log".to_string(),
        );
        writer.write_file(&record).unwrap();
        writer.finish().unwrap();

        let reader = IndexReader::open(&path).unwrap();
        assert_eq!(reader.file_record(0).unwrap().size, u32::MAX);
    }

    #[test]
    fn declared_but_missing_entries_fail_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.idx");
        let writer = IndexFileWriter::create(&path, [1, 0, 0, 0]).unwrap();
        assert!(writer.finish().is_err());
    }
}
