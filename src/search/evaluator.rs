use std::collections::HashMap;
use crate::codec::reader::IndexReader;
use crate::core::error::Result;
use crate::core::types::MetaId;

/// One matching file with its accumulated score and the record fields a
/// client needs to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub file: u32,
    pub score: u64,
    pub path: String,
    pub size: u32,
    pub title: String,
}

/// What a query produced: the hits plus any query words dropped because
/// they are stop words in this index.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub ignored: Vec<String>,
    pub hits: Vec<SearchHit>,
}

/// Additive rank scoring over an open index.
///
/// Each query word contributes the stored rank of every file it occurs
/// in; a file matching several words accumulates their ranks. Words
/// absent from the index contribute nothing, and words in the index's
/// stop segment are reported back as ignored rather than failing the
/// query.
pub struct QueryEvaluator<'a> {
    reader: &'a IndexReader,
    max_results: usize,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(reader: &'a IndexReader, max_results: usize) -> Self {
        QueryEvaluator {
            reader,
            max_results,
        }
    }

    /// Evaluate `words`, optionally restricted to occurrences tagged with
    /// `meta`. Hits come back sorted by descending score, ties broken by
    /// ascending file index, truncated to the result cap.
    pub fn evaluate(&self, words: &[String], meta: Option<MetaId>) -> Result<SearchOutcome> {
        let mut outcome = SearchOutcome::default();
        let mut scores: HashMap<u32, u64> = HashMap::new();

        for raw in words {
            let word = raw.to_lowercase();
            if word.is_empty() {
                continue;
            }
            if self.reader.has_stop_word(&word)? {
                outcome.ignored.push(word);
                continue;
            }
            let Some(entry) = self.reader.find_word(&word)? else {
                continue;
            };
            for occ in entry.occurrences() {
                let occ = occ?;
                if let Some(meta) = meta {
                    if !occ.metas.contains(&meta) {
                        continue;
                    }
                }
                *scores.entry(occ.file.0).or_insert(0) += occ.rank as u64;
            }
        }

        let mut ranked: Vec<(u32, u64)> = scores.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(self.max_results);

        for (file, score) in ranked {
            let record = self.reader.file_record(file)?;
            outcome.hits.push(SearchHit {
                file,
                score,
                path: record.path.to_string(),
                size: record.size,
                title: record.title.to_string(),
            });
        }
        Ok(outcome)
    }
}
