use crate::codec::varint::{Bcd, ENTRY_END, META_CLOSE, META_OPEN};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{FileIndex, FileOccurrence, MetaId};

/// Append one file-occurrence datum:
/// `file-index, [META_OPEN meta-id* META_CLOSE], count, rank`.
pub fn encode_occurrence(output: &mut Vec<u8>, occ: &FileOccurrence) {
    Bcd::encode(output, occ.file.0);
    if !occ.metas.is_empty() {
        output.push(META_OPEN);
        for meta in &occ.metas {
            Bcd::encode(output, meta.0);
        }
        output.push(META_CLOSE);
    }
    Bcd::encode(output, occ.count);
    Bcd::encode(output, occ.rank);
}

/// Append a full word entry: `word, NUL, datum+, ENTRY_END`.
pub fn encode_word_entry(output: &mut Vec<u8>, word: &str, occurrences: &[FileOccurrence]) {
    output.extend_from_slice(word.as_bytes());
    output.push(0);
    for occ in occurrences {
        encode_occurrence(output, occ);
    }
    output.push(ENTRY_END);
}

/// Lazy decoder over one word entry's occurrence bytes, stopping at the
/// terminator. Entries are decoded one at a time, on demand.
pub struct OccurrenceIter<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> OccurrenceIter<'a> {
    /// `data` starts at the first occurrence datum (just past the word's
    /// NUL).
    pub fn new(data: &'a [u8]) -> Self {
        OccurrenceIter {
            data,
            pos: 0,
            done: false,
        }
    }

    /// Bytes consumed, including the terminator once reached.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn decode_next(&mut self) -> Result<Option<FileOccurrence>> {
        if self.done {
            return Ok(None);
        }
        let rest = &self.data[self.pos..];
        if rest.is_empty() {
            return Err(Error::new(
                ErrorKind::Corrupt,
                "word entry missing terminator".to_string(),
            ));
        }
        if rest[0] == ENTRY_END {
            self.pos += 1;
            self.done = true;
            return Ok(None);
        }

        let mut at = 0;
        let (file, used, _) = Bcd::decode(&rest[at..])?;
        at += used;

        let mut metas = Vec::new();
        if rest.get(at) == Some(&META_OPEN) {
            at += 1;
            while rest.get(at) != Some(&META_CLOSE) {
                if at >= rest.len() {
                    return Err(Error::new(
                        ErrorKind::Corrupt,
                        "unterminated meta-id list".to_string(),
                    ));
                }
                let (meta, used, _) = Bcd::decode(&rest[at..])?;
                metas.push(MetaId(meta));
                at += used;
            }
            at += 1;
        }

        let (count, used, _) = Bcd::decode(&rest[at..])?;
        at += used;
        let (rank, used, _) = Bcd::decode(&rest[at..])?;
        at += used;

        self.pos += at;
        Ok(Some(FileOccurrence {
            file: FileIndex(file),
            metas,
            count,
            rank,
        }))
    }
}

impl<'a> Iterator for OccurrenceIter<'a> {
    type Item = Result<FileOccurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next().transpose()
    }
}

/// Count the occurrence data in a word entry without decoding values,
/// skipping over encoded integers byte-wise. Returns the datum count and
/// the total byte length including the terminator.
pub fn scan_file_count(data: &[u8]) -> Result<(u32, usize)> {
    let mut pos = 0;
    let mut count = 0u32;

    loop {
        match data.get(pos) {
            None => {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    "word entry missing terminator".to_string(),
                ));
            }
            Some(&ENTRY_END) => return Ok((count, pos + 1)),
            Some(_) => {}
        }

        pos += Bcd::skip(&data[pos..])?; // file index
        if data.get(pos) == Some(&META_OPEN) {
            pos += 1;
            while data.get(pos) != Some(&META_CLOSE) {
                if pos >= data.len() {
                    return Err(Error::new(
                        ErrorKind::Corrupt,
                        "unterminated meta-id list".to_string(),
                    ));
                }
                pos += Bcd::skip(&data[pos..])?;
            }
            pos += 1;
        }
        pos += Bcd::skip(&data[pos..])?; // count
        pos += Bcd::skip(&data[pos..])?; // rank
        count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FileOccurrence> {
        vec![
            FileOccurrence {
                file: FileIndex(0),
                metas: vec![],
                count: 3,
                rank: 120,
            },
            FileOccurrence {
                file: FileIndex(5),
                metas: vec![MetaId(0), MetaId(2)],
                count: 1,
                rank: 7,
            },
        ]
    }

    #[test]
    fn occurrences_round_trip() {
        let occs = sample();
        let mut buf = Vec::new();
        for occ in &occs {
            encode_occurrence(&mut buf, occ);
        }
        buf.push(ENTRY_END);

        let decoded: Result<Vec<_>> = OccurrenceIter::new(&buf).collect();
        assert_eq!(decoded.unwrap(), occs);
    }

    #[test]
    fn scan_matches_decode() {
        let occs = sample();
        let mut buf = Vec::new();
        for occ in &occs {
            encode_occurrence(&mut buf, occ);
        }
        buf.push(ENTRY_END);

        let (count, len) = scan_file_count(&buf).unwrap();
        assert_eq!(count, 2);
        assert_eq!(len, buf.len());
    }

    #[test]
    fn truncated_entry_is_an_error() {
        let occs = sample();
        let mut buf = Vec::new();
        encode_occurrence(&mut buf, &occs[0]);
        // No terminator.
        let items: Vec<_> = OccurrenceIter::new(&buf).collect();
        assert!(items.last().unwrap().is_err());
        assert!(scan_file_count(&buf).is_err());
    }
}
