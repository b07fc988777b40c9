use std::path::{Path, PathBuf};
use tracing::{debug, info};
use crate::analysis::content::{IndexerRegistry, WordSink};
use crate::analysis::word::{WordCollector, WordDecision};
use crate::codec::writer::IndexFileWriter;
use crate::core::context::IndexerContext;
use crate::core::error::Result;
use crate::core::types::{FileIndex, MetaId};
use crate::index::memory::InMemoryWordIndex;
use crate::index::merge::{MergeSource, Merger, PriorIndexCursor};
use crate::index::rank::RankEngine;
use crate::index::spill::{PartialIndexCursor, PartialIndexWriter};

/// Drives one indexing run: files in, finished index file out.
///
/// Files flow through the selected content indexer into the word
/// collector, accumulate in the in-memory index, spill to partial indices
/// past the threshold, and end in either a direct write (no spill) or the
/// n-way merge.
pub struct IndexBuilder {
    pub ctx: IndexerContext,
    pub collector: WordCollector,
    pub registry: IndexerRegistry,
    pub memory: InMemoryWordIndex,
    pub rank: RankEngine,
    prior: Option<PathBuf>,
}

impl IndexBuilder {
    pub fn new(ctx: IndexerContext) -> Self {
        let collector = WordCollector::new(
            ctx.config.min_word_length,
            ctx.config.min_normal_word_length,
        );
        let rank = RankEngine::new(ctx.config.word_file_max, ctx.config.word_percent_max);
        IndexBuilder {
            ctx,
            collector,
            registry: IndexerRegistry::with_defaults(),
            memory: InMemoryWordIndex::new(),
            rank,
            prior: None,
        }
    }

    /// Prepare an incremental run: preload the prior index's file list,
    /// meta-name table, and stop words so the new run extends them, and
    /// remember the path as one more merge source.
    pub fn with_prior(&mut self, path: &Path) -> Result<()> {
        let cursor = PriorIndexCursor::open(path)?;
        let reader = cursor.reader();

        for i in 0..reader.file_count() {
            let record = reader.file_record(i)?;
            let index = self.ctx.add_file(
                PathBuf::from(record.path),
                record.size as u64,
                record.title.to_string(),
            );
            self.ctx.file_mut(index).word_count = record.word_count;
        }
        for i in 0..reader.meta_count() {
            let name = reader.meta_name(i)?.to_string();
            self.ctx.metas.intern(&name);
        }
        for word in reader.stop_word_set()?.words {
            self.ctx.stop_words.insert(&word);
        }

        self.prior = Some(path.to_path_buf());
        Ok(())
    }

    /// Index one file, then spill if the in-memory word count tripped the
    /// threshold.
    pub fn index_file(&mut self, path: &Path) -> Result<()> {
        let size = std::fs::metadata(path)?.len();
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let file = self.ctx.add_file(path.to_path_buf(), size, title);

        let indexer = self.registry.select(path);
        let mut sink = FileSink {
            collector: &self.collector,
            ctx: &mut self.ctx,
            memory: &mut self.memory,
            file,
        };
        indexer.index_file(path, &mut sink)?;
        debug!(path = %path.display(), words = self.ctx.file(file).word_count, "indexed file");

        if self.memory.len() > self.ctx.config.spill_threshold {
            self.spill()?;
        }
        Ok(())
    }

    fn spill(&mut self) -> Result<()> {
        let entries = self.memory.drain_sorted();
        let path = PartialIndexWriter::write(&entries)?;
        debug!(words = entries.len(), segment = %path.display(), "spilled partial index");
        self.ctx.partials.push(path);
        self.ctx.spill_count += 1;
        Ok(())
    }

    /// Finalize the run and write the index file.
    pub fn finish(mut self) -> Result<()> {
        let out = self.ctx.config.index_path.clone();
        if self.ctx.partials.is_empty() && self.prior.is_none() {
            self.write_direct(&out)?;
        } else {
            if !self.memory.is_empty() {
                self.spill()?;
            }
            self.write_merged(&out)?;
        }
        info!(
            index = %out.display(),
            files = self.ctx.files.len(),
            total_words = self.ctx.total_words,
            indexed_words = self.ctx.indexed_words,
            spills = self.ctx.spill_count,
            "index written"
        );
        Ok(())
    }

    /// No spill happened: rank in memory and stream straight to disk.
    fn write_direct(&mut self, out: &Path) -> Result<()> {
        let total_files = self.ctx.file_count();
        let entries = self.memory.drain_sorted();

        // Frequency filter first; promotions must land before the header
        // counts are fixed.
        let mut kept = Vec::with_capacity(entries.len());
        for (word, entry) in entries {
            let file_count = entry.occurrences.len() as u32;
            if self.rank.too_frequent(file_count, total_files) {
                self.ctx.stop_words.insert(&word);
            } else {
                kept.push((word, entry));
            }
        }

        let mut writer = IndexFileWriter::create(
            out,
            [
                kept.len() as u32,
                self.ctx.stop_words.len() as u32,
                self.ctx.files.len() as u32,
                self.ctx.metas.len() as u32,
            ],
        )?;

        for (word, mut entry) in kept {
            let total = entry.total;
            for occ in entry.occurrences.iter_mut() {
                let word_count = self.ctx.files[occ.file.0 as usize].word_count;
                occ.rank = self.rank.rank(occ.count, total, word_count);
            }
            writer.write_word(&word, &entry.occurrences)?;
        }
        self.write_tail_segments(writer)
    }

    /// At least one spill (or a prior index): run the two merge passes.
    fn write_merged(&mut self, out: &Path) -> Result<()> {
        let total_files = self.ctx.file_count();
        let merger = Merger::new(self.rank);

        let sources = self.merge_sources()?;
        let unique = merger.precount(sources, &mut self.ctx.stop_words, total_files)?;

        let mut writer = IndexFileWriter::create(
            out,
            [
                unique,
                self.ctx.stop_words.len() as u32,
                self.ctx.files.len() as u32,
                self.ctx.metas.len() as u32,
            ],
        )?;

        let sources = self.merge_sources()?;
        merger.write(sources, &self.ctx.stop_words, &self.ctx.files, &mut writer)?;
        self.write_tail_segments(writer)
    }

    fn merge_sources(&self) -> Result<Vec<Box<dyn MergeSource>>> {
        let mut sources: Vec<Box<dyn MergeSource>> = Vec::new();
        for path in &self.ctx.partials {
            sources.push(Box::new(PartialIndexCursor::open(path)?));
        }
        if let Some(prior) = &self.prior {
            sources.push(Box::new(PriorIndexCursor::open(prior)?));
        }
        Ok(sources)
    }

    /// Stop-word, file, and meta-name segments, then the offset patch.
    fn write_tail_segments(&self, mut writer: IndexFileWriter) -> Result<()> {
        for word in self.ctx.stop_words.sorted() {
            writer.write_stop_word(word)?;
        }
        for record in &self.ctx.files {
            writer.write_file(record)?;
        }
        for name in &self.ctx.metas.names {
            writer.write_meta(name)?;
        }
        writer.finish()
    }
}

/// Word sink for one file: applies the collector's decision, keeps the
/// counters honest, and forwards indexable words to the in-memory index.
struct FileSink<'a> {
    collector: &'a WordCollector,
    ctx: &'a mut IndexerContext,
    memory: &'a mut InMemoryWordIndex,
    file: FileIndex,
}

impl WordSink for FileSink<'_> {
    fn word(&mut self, raw: &str, meta: Option<MetaId>) {
        match self.collector.evaluate(raw, &self.ctx.stop_words) {
            WordDecision::Indexed(word) => {
                self.ctx.total_words += 1;
                self.ctx.indexed_words += 1;
                self.ctx.file_mut(self.file).word_count += 1;
                self.memory.record(&word, self.file, meta);
            }
            WordDecision::StopWord => {
                // Counts toward words seen and the file's length, but is
                // not indexed.
                self.ctx.total_words += 1;
                self.ctx.file_mut(self.file).word_count += 1;
            }
            WordDecision::Rejected => {}
        }
    }

    fn meta(&mut self, name: &str) -> MetaId {
        self.ctx.metas.intern(name)
    }

    fn title(&mut self, title: &str) {
        self.ctx.file_mut(self.file).title = title.to_string();
    }
}
