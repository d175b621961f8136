use std::ops::Range;

use crate::policy::ReadabilityPolicy;
use crate::word::Word;

/// Cut after every sentence terminator, and before any word that follows a silence longer than
/// `gap_threshold`.
pub(super) fn split_sentences(words: &[Word], policy: &ReadabilityPolicy) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0usize;

    for i in 0..words.len() {
        if i > start && words[i].start - words[i - 1].end > policy.gap_threshold {
            groups.push(start..i);
            start = i;
        }
        if policy.is_sentence_end(&words[i].text) {
            groups.push(start..i + 1);
            start = i + 1;
        }
    }

    if start < words.len() {
        groups.push(start..words.len());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(text: &str, start: f64, end: f64) -> Word {
        Word::new(text, start, end)
    }

    #[test]
    fn cuts_after_terminators() {
        let words = vec![
            w("Hi", 0.0, 0.2),
            w("there.", 0.2, 0.5),
            w("How", 0.6, 0.8),
            w("are", 0.8, 0.9),
            w("you?", 0.9, 1.2),
        ];
        let groups = split_sentences(&words, &ReadabilityPolicy::default());
        assert_eq!(groups, vec![0..2, 2..5]);
    }

    #[test]
    fn cuts_on_long_silence() {
        let words = vec![w("one", 0.0, 0.3), w("two", 0.4, 0.7), w("three", 2.0, 2.4)];
        let groups = split_sentences(&words, &ReadabilityPolicy::default());
        assert_eq!(groups, vec![0..2, 2..3]);
    }

    #[test]
    fn silence_after_terminator_does_not_emit_empty_group() {
        let words = vec![w("Done.", 0.0, 0.4), w("Next", 5.0, 5.3)];
        let groups = split_sentences(&words, &ReadabilityPolicy::default());
        assert_eq!(groups, vec![0..1, 1..2]);
    }
}
