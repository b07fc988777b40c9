use std::collections::HashSet;
use std::fs;
use std::path::Path;
use crate::core::error::{Error, ErrorKind, Result};

/// Case-insensitive set of words excluded from indexing.
///
/// Grows monotonically during a run: seeded from the built-in list, an
/// optional file, or a prior index's stop segment, and extended whenever a
/// word is promoted for being too frequent. Words are never removed.
#[derive(Debug, Clone, Default)]
pub struct StopWordSet {
    pub words: HashSet<String>,
}

impl StopWordSet {
    pub fn empty() -> Self {
        StopWordSet::default()
    }

    /// Built-in default list.
    pub fn builtin() -> Self {
        let words = [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for",
            "from", "has", "he", "in", "is", "it", "its", "not", "of", "on",
            "or", "that", "the", "this", "to", "was", "will", "with",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        StopWordSet { words }
    }

    /// Load additional words from a file, one per line. Blank lines and
    /// `#` comment lines are skipped.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                format!("cannot read stop-word file {}: {}", path.display(), e),
            )
        })?;

        for line in text.lines() {
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            self.words.insert(word.to_lowercase());
        }
        Ok(())
    }

    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        // Callers usually pass lowercased words already; fall back for
        // mixed-case probes so the check stays case-insensitive.
        self.words.contains(&word.to_lowercase())
    }

    pub fn insert(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in ascending order, the order the index file stores them in.
    pub fn sorted(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.words.iter().map(|w| w.as_str()).collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn contains_is_case_insensitive() {
        let set = StopWordSet::builtin();
        assert!(set.contains("the"));
        assert!(set.contains("The"));
        assert!(!set.contains("albatross"));
    }

    #[test]
    fn load_file_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment\n\nFoo\nbar").unwrap();

        let mut set = StopWordSet::empty();
        set.load_file(file.path()).unwrap();
        assert!(set.contains("foo"));
        assert!(set.contains("bar"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sorted_is_ascending() {
        let mut set = StopWordSet::empty();
        set.insert("zebra");
        set.insert("ant");
        assert_eq!(set.sorted(), vec!["ant", "zebra"]);
    }
}
