/// Rank computation and frequency caps.
///
/// The rank formula is the fixed legacy one: term frequency weighted by
/// inverse corpus frequency, normalized by document length, truncated to an
/// integer. It must stay byte-for-byte compatible with existing indexes, so
/// the `ln(x) + 10` term and the single final truncation are load-bearing.
#[derive(Debug, Clone, Copy)]
pub struct RankEngine {
    /// Absolute cap on the number of files a word may occur in.
    /// `u32::MAX` means no cap.
    pub word_file_max: u32,
    /// Percentage-of-corpus cap. Values >= 100 disable the cap; a word in
    /// every file of a corpus is only "too frequent" if the cap was
    /// lowered explicitly.
    pub word_percent_max: u32,
}

impl Default for RankEngine {
    fn default() -> Self {
        RankEngine {
            word_file_max: u32::MAX,
            word_percent_max: 100,
        }
    }
}

impl RankEngine {
    pub fn new(word_file_max: u32, word_percent_max: u32) -> Self {
        RankEngine {
            word_file_max,
            word_percent_max,
        }
    }

    /// Should this word be a stop word instead of an index entry?
    pub fn too_frequent(&self, file_count: u32, total_files: u32) -> bool {
        if file_count > self.word_file_max {
            return true;
        }
        if self.word_percent_max < 100 && total_files > 0 {
            let percent = file_count as u64 * 100 / total_files as u64;
            if percent >= self.word_percent_max as u64 {
                return true;
            }
        }
        false
    }

    /// Per-(word, file) rank, always >= 1 for any word that survived the
    /// frequency filter.
    pub fn rank(&self, occurrences_in_file: u32, total_occurrences: u32, file_word_count: u32) -> u32 {
        let occ = occurrences_in_file.max(1) as f64;
        let total = total_occurrences.max(1) as f64;
        let words = file_word_count.max(1) as f64;

        let value = (occ.ln() + 10.0) * (10_000.0 / total) / words;
        (value as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_matches_the_legacy_formula() {
        let engine = RankEngine::default();
        // (ln(2) + 10) * (10000 / 3) / 3 = 11881.27 -> 11881
        assert_eq!(engine.rank(2, 3, 3), 11_881);
        // (ln(1) + 10) * (10000 / 3) / 4 = 8333.33 -> 8333
        assert_eq!(engine.rank(1, 3, 4), 8_333);
    }

    #[test]
    fn rank_never_drops_below_one() {
        let engine = RankEngine::default();
        assert_eq!(engine.rank(1, 1_000_000, 1_000_000), 1);
    }

    #[test]
    fn absolute_file_cap() {
        let engine = RankEngine::new(2, 100);
        assert!(!engine.too_frequent(2, 5));
        assert!(engine.too_frequent(3, 5));
    }

    #[test]
    fn percent_cap_disabled_at_default() {
        let engine = RankEngine::default();
        // Word in every file of a two-file corpus stays indexable.
        assert!(!engine.too_frequent(2, 2));
    }

    #[test]
    fn percent_cap_applies_when_lowered() {
        let engine = RankEngine::new(u32::MAX, 50);
        assert!(!engine.too_frequent(2, 5)); // 40%
        assert!(engine.too_frequent(3, 5)); // 60%
    }
}
