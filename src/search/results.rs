use std::fmt::Write;
use crate::search::evaluator::SearchOutcome;

/// Render a search outcome in the wire format: an optional `# ignored:`
/// line, a `# results: N` line, then one `rank path size title` line per
/// hit.
pub fn format_response(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    if !outcome.ignored.is_empty() {
        out.push_str("# ignored:");
        for word in &outcome.ignored {
            out.push(' ');
            out.push_str(word);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "# results: {}", outcome.hits.len());
    for hit in &outcome.hits {
        let _ = writeln!(out, "{} {} {} {}", hit.score, hit.path, hit.size, hit.title);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::evaluator::SearchHit;

    #[test]
    fn formats_hits_and_ignored_words() {
        let outcome = SearchOutcome {
            ignored: vec!["the".to_string(), "of".to_string()],
            hits: vec![SearchHit {
                file: 3,
                score: 11_881,
                path: "doc/a.txt".to_string(),
                size: 120,
                title: "a.txt".to_string(),
            }],
        };
        assert_eq!(
            format_response(&outcome),
            "# ignored: the of\n# results: 1\n11881 doc/a.txt 120 a.txt\n"
        );
    }

    #[test]
    fn empty_outcome_is_a_bare_count() {
        assert_eq!(format_response(&SearchOutcome::default()), "# results: 0\n");
    }
}
