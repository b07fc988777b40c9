use std::fs;
use std::path::Path;
use crate::core::error::Result;
use crate::core::types::MetaId;

/// Receives the tagged word stream a content indexer produces.
pub trait WordSink {
    fn word(&mut self, raw: &str, meta: Option<MetaId>);

    /// Intern a meta-name, e.g. an HTML META tag's NAME, yielding the id
    /// to tag subsequent words with.
    fn meta(&mut self, name: &str) -> MetaId;

    /// Called at most once if the content carries a better title than the
    /// file name.
    fn title(&mut self, title: &str);
}

/// A content-specific indexer: turns one file into a title plus a stream
/// of candidate words, each optionally tagged with a meta-name id.
///
/// HTML and mail indexers are external to this crate; the plain-text
/// indexer below is the built-in fallback.
pub trait ContentIndexer: Send + Sync {
    fn name(&self) -> &str;

    /// File-name extensions this indexer claims, lowercase, without dots.
    fn extensions(&self) -> &[&str];

    fn index_file(&self, path: &Path, sink: &mut dyn WordSink) -> Result<()>;
}

/// Whitespace-splitting plain-text indexer.
pub struct TextIndexer;

impl ContentIndexer for TextIndexer {
    fn name(&self) -> &str {
        "text"
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "text", "md", "rst", "log"]
    }

    fn index_file(&self, path: &Path, sink: &mut dyn WordSink) -> Result<()> {
        let text = fs::read_to_string(path)?;
        for token in text.split_whitespace() {
            sink.word(token, None);
        }
        Ok(())
    }
}

/// Extension → indexer registry, built explicitly at startup.
pub struct IndexerRegistry {
    indexers: Vec<Box<dyn ContentIndexer>>,
    /// Position of the fallback used for unclaimed extensions.
    fallback: usize,
}

impl IndexerRegistry {
    /// Registry with the built-in set: plain text, which is also the
    /// fallback for unknown extensions.
    pub fn with_defaults() -> Self {
        IndexerRegistry {
            indexers: vec![Box::new(TextIndexer)],
            fallback: 0,
        }
    }

    pub fn register(&mut self, indexer: Box<dyn ContentIndexer>) {
        self.indexers.push(indexer);
    }

    /// Pick the indexer for a path by extension, falling back to text.
    pub fn select(&self, path: &Path) -> &dyn ContentIndexer {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        if let Some(ext) = ext {
            for indexer in &self.indexers {
                if indexer.extensions().contains(&ext.as_str()) {
                    return indexer.as_ref();
                }
            }
        }
        self.indexers[self.fallback].as_ref()
    }
}
