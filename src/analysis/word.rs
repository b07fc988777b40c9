use crate::analysis::stopwords::StopWordSet;

/// Outcome for one candidate token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordDecision {
    /// Token is indexable; carries the lowercased form.
    Indexed(String),
    /// Token is a stop word. Counts toward words seen, not words indexed.
    StopWord,
    /// Token failed the acceptance heuristics. Not counted at all.
    Rejected,
}

/// Word-boundary and acceptance heuristics.
///
/// The content indexers hand over raw tokens already stripped of markup;
/// this decides whether each one is worth indexing and normalizes case.
/// All checks work on the lowercased form, so re-running the test on an
/// accepted word's output gives the same answer.
#[derive(Debug, Clone)]
pub struct WordCollector {
    /// Absolute hard minimum length, applied before anything else.
    pub min_length: usize,
    /// Words shorter than this are acronym candidates and only survive
    /// the lenient short-word branches of `is_ok_word`.
    pub min_normal_length: usize,
    /// All-hex-digit tokens shorter than this are rejected.
    pub min_hex_length: usize,
    /// Words longer than this must contain at least one vowel.
    pub max_vowelless_length: usize,
    pub max_consonant_run: usize,
    pub max_vowel_run: usize,
    pub max_same_run: usize,
    pub max_punct_run: usize,
}

impl Default for WordCollector {
    fn default() -> Self {
        WordCollector {
            min_length: 2,
            min_normal_length: 3,
            min_hex_length: 8,
            max_vowelless_length: 4,
            max_consonant_run: 6,
            max_vowel_run: 5,
            max_same_run: 3,
            max_punct_run: 1,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

impl WordCollector {
    pub fn new(min_length: usize, min_normal_length: usize) -> Self {
        WordCollector {
            min_length,
            min_normal_length,
            ..WordCollector::default()
        }
    }

    /// Apply the acceptance rules, in order, to one candidate token.
    pub fn evaluate(&self, raw: &str, stop_words: &StopWordSet) -> WordDecision {
        // Cheap length gate before any trimming.
        if raw.chars().count() < self.min_length {
            return WordDecision::Rejected;
        }

        let trimmed = self.trim(raw);
        if trimmed.chars().count() < self.min_length {
            return WordDecision::Rejected;
        }

        let word = trimmed.to_lowercase();
        if !self.is_ok_word(&word) {
            return WordDecision::Rejected;
        }

        if stop_words.contains(&word) {
            return WordDecision::StopWord;
        }

        WordDecision::Indexed(word)
    }

    /// Strip characters that cannot begin or end a word (anything that is
    /// not a letter or digit).
    pub fn trim<'a>(&self, raw: &'a str) -> &'a str {
        raw.trim_matches(|c| !is_word_char(c))
    }

    /// Heuristic acceptance test, case-insensitive.
    ///
    /// Combines: all-hex rejection below a length floor, a vowel minimum
    /// for words past acronym length, and run caps on consecutive
    /// consonants, vowels, identical characters, and punctuation.
    pub fn is_ok_word(&self, word: &str) -> bool {
        let chars: Vec<char> = word.to_lowercase().chars().collect();
        let len = chars.len();

        if len < self.min_length {
            return false;
        }

        // Hex-looking noise: every character a hex digit with at least one
        // actual digit present. Short runs of these are hashes and ids.
        let all_hex = chars.iter().all(|c| c.is_ascii_hexdigit());
        let has_digit = chars.iter().any(|c| c.is_ascii_digit());
        if all_hex && has_digit && len < self.min_hex_length {
            return false;
        }

        // Vowel minimum, waived for short acronym-length words.
        let vowels = chars.iter().filter(|&&c| is_vowel(c)).count();
        let has_letter = chars.iter().any(|c| c.is_alphabetic());
        if has_letter && vowels == 0 && len > self.max_vowelless_length {
            return false;
        }

        // Run caps.
        let mut consonant_run = 0;
        let mut vowel_run = 0;
        let mut punct_run = 0;
        let mut same_run = 0;
        let mut prev = '\0';

        for &c in &chars {
            if c == prev {
                same_run += 1;
            } else {
                same_run = 1;
                prev = c;
            }
            if same_run > self.max_same_run {
                return false;
            }

            if c.is_alphabetic() {
                punct_run = 0;
                if is_vowel(c) {
                    vowel_run += 1;
                    consonant_run = 0;
                } else {
                    consonant_run += 1;
                    vowel_run = 0;
                }
            } else if c.is_ascii_digit() {
                consonant_run = 0;
                vowel_run = 0;
                punct_run = 0;
            } else {
                consonant_run = 0;
                vowel_run = 0;
                punct_run += 1;
            }

            if consonant_run > self.max_consonant_run
                || vowel_run > self.max_vowel_run
                || punct_run > self.max_punct_run
            {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> WordCollector {
        WordCollector::default()
    }

    #[test]
    fn rejects_below_hard_minimum() {
        let stop = StopWordSet::empty();
        assert_eq!(collector().evaluate("x", &stop), WordDecision::Rejected);
        assert_eq!(
            collector().evaluate("ox", &stop),
            WordDecision::Indexed("ox".to_string())
        );
    }

    #[test]
    fn trims_edge_punctuation_then_rechecks() {
        let stop = StopWordSet::empty();
        assert_eq!(
            collector().evaluate("(hello)", &stop),
            WordDecision::Indexed("hello".to_string())
        );
        // A single letter left after trimming fails the hard minimum.
        assert_eq!(collector().evaluate("--x--", &stop), WordDecision::Rejected);
    }

    #[test]
    fn rejects_short_hex_noise_but_not_hex_words() {
        let c = collector();
        assert!(!c.is_ok_word("3fa9"));
        assert!(!c.is_ok_word("deadb33f"));
        // No digit present, so "face" and "cafe" are ordinary words.
        assert!(c.is_ok_word("face"));
        assert!(c.is_ok_word("decade"));
    }

    #[test]
    fn vowel_minimum_waived_for_acronyms() {
        let c = collector();
        assert!(c.is_ok_word("xml"));
        assert!(c.is_ok_word("http"));
        assert!(!c.is_ok_word("bcdfgh"));
    }

    #[test]
    fn run_caps_apply() {
        let c = collector();
        assert!(!c.is_ok_word("aaaa"));
        assert!(!c.is_ok_word("strnghtsklv"));
        assert!(c.is_ok_word("strengths"));
        assert!(c.is_ok_word("o'brien"));
        assert!(!c.is_ok_word("a--b"));
    }

    #[test]
    fn stop_words_are_reported_not_rejected() {
        let stop = StopWordSet::builtin();
        assert_eq!(collector().evaluate("The", &stop), WordDecision::StopWord);
    }

    #[test]
    fn acceptance_is_idempotent_under_lowercasing() {
        let c = collector();
        let stop = StopWordSet::empty();
        for raw in ["Hello", "XML", "(Quoted)", "MiXeD99", "O'Brien", "DEADB33F"] {
            match c.evaluate(raw, &stop) {
                WordDecision::Indexed(word) => {
                    assert_eq!(
                        c.evaluate(&word, &stop),
                        WordDecision::Indexed(word.clone()),
                        "{raw} changed acceptability after normalization"
                    );
                }
                other => {
                    // Re-running on the lowercased input must agree.
                    assert_eq!(c.evaluate(&raw.to_lowercase(), &stop), other);
                }
            }
        }
    }
}
